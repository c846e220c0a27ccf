//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the fit pipeline
//! - prints the report/plot
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs};
use crate::domain::FitConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `knee` binary.
pub fn run() -> Result<(), AppError> {
    // We want `knee data.csv` to behave like `knee fit data.csv`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the convenient one-argument UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, run.initial_objective, &run.outcome, &config)
    );
    println!("{}", crate::report::format_residual_table(&run.residuals));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(
            &run.residuals,
            &run.outcome.params,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.residuals)?;
    }
    if let Some(path) = &config.export_curve {
        crate::io::curve::write_curve_json(
            path,
            &run.outcome,
            run.ingest.stats.x_min,
            run.ingest.stats.x_max,
        )?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::curve::read_curve_json(&args.curve)?;
    let plot = crate::plot::render_ascii_plot_from_curve_file(&curve, args.width, args.height);
    println!("{plot}");
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        data_path: args.data.clone(),
        coeff_guess: args.coeff_guess,
        x0_guess: args.x0_guess,
        coeff_bound: args.coeff_bound,
        x0_min: args.x0_min,
        x0_max: args.x0_max,
        max_iters: args.max_iters,
        tol: args.tol,
        ctol: args.ctol,
        starts: args.starts,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_curve: args.export_curve.clone(),
    }
}

/// Rewrite argv so `knee <file>` defaults to `knee fit <file>`.
///
/// Rules:
/// - `knee`                    -> unchanged (clap prints the help)
/// - `knee data.csv ...`       -> `knee fit data.csv ...`
/// - `knee --x0-guess 2 d.csv` -> `knee fit --x0-guess 2 d.csv`
/// - `knee --help/--version`   -> unchanged
/// - explicit subcommands      -> unchanged
fn rewrite_args(argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "plot");
    if is_subcommand {
        return argv;
    }

    let mut argv = argv;
    argv.insert(1, "fit".to_string());
    argv
}
