//! Fit orchestration.
//!
//! Builds the initial guess and bounds from the run configuration, runs the
//! constrained solve from each breakpoint start (in parallel when more than
//! one), and selects the best result deterministically:
//!
//! 1. feasible results beat infeasible ones
//! 2. lower SSE wins
//! 3. ties break by start index

use rayon::prelude::*;

use crate::domain::{
    DatasetStats, FitConfig, FitOutcome, PARAM_LEN, ParamBounds, PiecewiseParams, Quadratic,
    Sample,
};
use crate::error::AppError;
use crate::fit::solver::{SolveOptions, minimize};
use crate::fit::starts::x0_starts;

/// Resolved bounds for a run: defaults follow the original formulation
/// (coefficients in `[-coeff_bound, coeff_bound]`, breakpoint in
/// `[0, n_samples]` unless overridden).
pub fn resolve_bounds(config: &FitConfig, n_samples: usize) -> ParamBounds {
    let x0_max = config.x0_max.unwrap_or(n_samples as f64);
    ParamBounds::new(config.coeff_bound, config.x0_min, x0_max)
}

/// The fixed initial guess for a run.
///
/// All six coefficients start at `coeff_guess`; the breakpoint starts at the
/// configured guess, or the midpoint of the observed x range.
pub fn initial_params(config: &FitConfig, stats: &DatasetStats) -> PiecewiseParams {
    let g = config.coeff_guess;
    let x0 = config
        .x0_guess
        .unwrap_or_else(|| 0.5 * (stats.x_min + stats.x_max));
    PiecewiseParams::new(Quadratic::new(g, g, g), Quadratic::new(g, g, g), x0)
}

/// Fit the piecewise quadratic to `samples` per `config`.
///
/// Never fails on non-convergence: the returned outcome carries the solver's
/// success flag and best-effort parameters. Fails only when there is nothing
/// to fit.
pub fn fit_piecewise(
    samples: &[Sample],
    stats: &DatasetStats,
    config: &FitConfig,
) -> Result<FitOutcome, AppError> {
    if samples.is_empty() {
        return Err(AppError::new(3, "No samples to fit."));
    }

    let bounds = resolve_bounds(config, samples.len());
    let opts = SolveOptions {
        max_iters: config.max_iters,
        tol: config.tol,
        ctol: config.ctol,
    };

    let guess = initial_params(config, stats);
    let start_arr = bounds.clamp(&guess.to_array());

    // Breakpoint starts: the guess itself, plus an optional grid across the
    // in-bounds part of the data range.
    let lo = stats.x_min.max(bounds.lower[PARAM_LEN - 1]);
    let hi = stats.x_max.min(bounds.upper[PARAM_LEN - 1]);
    let starts = x0_starts(start_arr[PARAM_LEN - 1], lo.min(hi), hi.max(lo), config.starts);

    let candidates: Vec<(usize, FitOutcome)> = starts
        .par_iter()
        .enumerate()
        .map(|(idx, &x0)| {
            let mut start = start_arr;
            start[PARAM_LEN - 1] = x0;
            (idx, minimize(samples, &start, &bounds, &opts))
        })
        .collect();

    let best = select_best(candidates, opts.ctol).ok_or_else(|| {
        AppError::new(4, "No fit candidates produced a finite objective.")
    })?;

    Ok(best)
}

/// Deterministic candidate selection.
fn select_best(candidates: Vec<(usize, FitOutcome)>, ctol: f64) -> Option<FitOutcome> {
    let mut best: Option<(usize, FitOutcome)> = None;

    for (idx, out) in candidates {
        if !out.quality.sse.is_finite() {
            continue;
        }
        let replace = match &best {
            None => true,
            Some((best_idx, cur)) => {
                let cand_feasible = out.solver.constraint_norm() <= ctol;
                let cur_feasible = cur.solver.constraint_norm() <= ctol;
                if cand_feasible != cur_feasible {
                    cand_feasible
                } else if out.quality.sse != cur.quality.sse {
                    out.quality.sse < cur.quality.sse
                } else {
                    idx < *best_idx
                }
            }
        };
        if replace {
            best = Some((idx, out));
        }
    }

    best.map(|(_, out)| out)
}
