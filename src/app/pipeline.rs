//! Shared "fit pipeline" logic.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> initial objective -> constrained fit -> residuals
//!
//! The CLI front-end then focuses on presentation (printing/plotting).

use crate::domain::{FitConfig, FitOutcome, SampleResidual};
use crate::error::AppError;
use crate::fit::{fit_piecewise, initial_params};
use crate::fit::problem::sum_squared_residuals;
use crate::io::ingest::{IngestedData, load_samples};
use crate::report::compute_residuals;

/// All computed outputs of a single fit run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    /// Objective value at the initial guess, before optimization.
    pub initial_objective: f64,
    pub outcome: FitOutcome,
    pub residuals: Vec<SampleResidual>,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    // 1) Load and validate the sample file.
    let ingest = load_samples(&config.data_path)?;

    // 2) Objective at the starting point (reported alongside the final one).
    let guess = initial_params(config, &ingest.stats);
    let initial_objective = sum_squared_residuals(&ingest.samples, &guess);

    // 3) Constrained solve.
    let outcome = fit_piecewise(&ingest.samples, &ingest.stats, config)?;

    // 4) Fitted values and residuals for reporting/export.
    let residuals = compute_residuals(&ingest.samples, &outcome.params)?;

    Ok(RunOutput {
        ingest,
        initial_objective,
        outcome,
        residuals,
    })
}
