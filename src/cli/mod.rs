//! Command-line parsing for the breakpoint fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "knee",
    version,
    about = "Piecewise-Quadratic Breakpoint Fitter (two segments, one knee)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the two-segment curve to a data file, print diagnostics, and
    /// optionally plot/export.
    Fit(FitArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
}

/// Options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Two-column data file, no header row: column 0 = x, column 1 = y.
    pub data: PathBuf,

    /// Initial guess applied to all six quadratic coefficients.
    #[arg(long, default_value_t = 0.5)]
    pub coeff_guess: f64,

    /// Initial breakpoint guess (default: midpoint of the observed x range).
    #[arg(long)]
    pub x0_guess: Option<f64>,

    /// Symmetric bound on each quadratic coefficient.
    #[arg(long, default_value_t = 50.0)]
    pub coeff_bound: f64,

    /// Lower bound on the breakpoint.
    #[arg(long, default_value_t = 0.0)]
    pub x0_min: f64,

    /// Upper bound on the breakpoint (default: the sample count).
    #[arg(long)]
    pub x0_max: Option<f64>,

    /// Cap on solver iterations.
    #[arg(long, default_value_t = 500)]
    pub max_iters: usize,

    /// Tolerance on successive objective/step improvement.
    #[arg(long, default_value_t = 1e-9)]
    pub tol: f64,

    /// Feasibility tolerance on each constraint gap.
    #[arg(long, default_value_t = 1e-6)]
    pub ctol: f64,

    /// Number of breakpoint starts (a grid across the x range when > 1).
    #[arg(long, default_value_t = 1)]
    pub starts: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-sample results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the fitted curve (params + grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Curve JSON file produced by `knee fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
