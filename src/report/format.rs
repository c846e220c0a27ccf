//! Residual computation and terminal report formatting.

use crate::domain::{FitConfig, FitOutcome, PiecewiseParams, Sample, SampleResidual};
use crate::error::AppError;
use crate::io::ingest::IngestedData;
use crate::models::predict_tagged;

/// Compute fitted values and residuals for each sample.
pub fn compute_residuals(
    samples: &[Sample],
    params: &PiecewiseParams,
) -> Result<Vec<SampleResidual>, AppError> {
    let mut out = Vec::with_capacity(samples.len());
    for s in samples {
        let (y_fit, segment) = predict_tagged(s.x, params);
        if !y_fit.is_finite() {
            return Err(AppError::new(
                4,
                "Non-finite model prediction during residual computation.",
            ));
        }
        out.push(SampleResidual {
            sample: *s,
            y_fit,
            residual: s.y - y_fit,
            segment,
        });
    }
    Ok(out)
}

/// Format the full run summary: dataset stats, initial objective, the solver
/// result record, final objective, and the seven fitted parameters.
pub fn format_run_summary(
    ingest: &IngestedData,
    initial_objective: f64,
    outcome: &FitOutcome,
    config: &FitConfig,
) -> String {
    let mut out = String::new();

    out.push_str("=== knee - Piecewise Quadratic Breakpoint Fit ===\n");
    out.push_str(&format!("Input: {}\n", config.data_path.display()));
    out.push_str(&format!(
        "Samples: n={} (read {}, skipped {}) | x=[{:.4}, {:.4}] | y=[{:.4}, {:.4}]\n",
        ingest.stats.n_points,
        ingest.rows_read,
        ingest.row_errors.len(),
        ingest.stats.x_min,
        ingest.stats.x_max,
        ingest.stats.y_min,
        ingest.stats.y_max,
    ));
    if let Some(note) = &ingest.note {
        out.push_str(&format!("Note: {note}\n"));
    }
    for e in &ingest.row_errors {
        out.push_str(&format!("  (skipped line {}) {}\n", e.line, e.message));
    }

    out.push_str(&format!("\nInitial objective: {initial_objective:.6}\n"));

    let s = &outcome.solver;
    out.push_str("\nSolver result:\n");
    out.push_str(&format!("- success   : {}\n", s.converged));
    out.push_str(&format!("- status    : {}\n", s.message));
    out.push_str(&format!("- iterations: {}\n", s.iterations));
    out.push_str(&format!("- objective : {:.6}\n", s.objective));
    out.push_str(&format!(
        "- continuity gap: {:.3e} | slope gap: {:.3e}\n",
        s.continuity_gap, s.slope_gap
    ));

    out.push_str(&format!(
        "\nFinal objective: {:.6} (rmse {:.6}, n={})\n",
        outcome.quality.sse, outcome.quality.rmse, outcome.quality.n
    ));

    let p = &outcome.params;
    out.push_str("\nFitted parameters:\n");
    out.push_str(&format!(
        "- segment 1: a1={:.6}, b1={:.6}, c1={:.6}\n",
        p.seg1.a, p.seg1.b, p.seg1.c
    ));
    out.push_str(&format!(
        "- segment 2: a2={:.6}, b2={:.6}, c2={:.6}\n",
        p.seg2.a, p.seg2.b, p.seg2.c
    ));
    out.push_str(&format!("- breakpoint: x0={:.6}\n", p.x0));

    out
}

/// Format the per-sample residual table.
pub fn format_residual_table(residuals: &[SampleResidual]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{:>12} {:>12} {:>12} {:>12} {:<7}\n",
        "x", "y_obs", "y_fit", "residual", "segment"
    ));
    out.push_str(&format!(
        "{:->12} {:->12} {:->12} {:->12} {:-<7}\n",
        "", "", "", "", ""
    ));

    for r in residuals {
        out.push_str(&format!(
            "{:>12.4} {:>12.4} {:>12.4} {:>12.4} {:<7}\n",
            r.sample.x,
            r.sample.y,
            r.y_fit,
            r.residual,
            r.segment.label(),
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DatasetStats, FitQuality, Quadratic, Segment, SolverReport};

    fn params() -> PiecewiseParams {
        PiecewiseParams::new(
            Quadratic::new(1.0, 0.0, 0.0),
            Quadratic::new(0.0, 5.0, -6.0),
            2.0,
        )
    }

    #[test]
    fn compute_residuals_tags_segments() {
        let samples = vec![
            Sample { x: 1.0, y: 1.5 },
            Sample { x: 3.0, y: 9.0 },
        ];
        let residuals = compute_residuals(&samples, &params()).unwrap();
        assert_eq!(residuals.len(), 2);
        assert_eq!(residuals[0].segment, Segment::First);
        assert!((residuals[0].residual - 0.5).abs() < 1e-12);
        assert_eq!(residuals[1].segment, Segment::Second);
        assert!(residuals[1].residual.abs() < 1e-12);
    }

    #[test]
    fn run_summary_contains_all_required_records() {
        let ingest = IngestedData {
            samples: vec![Sample { x: 0.0, y: 0.0 }],
            stats: DatasetStats {
                n_points: 1,
                x_min: 0.0,
                x_max: 5.0,
                y_min: 0.0,
                y_max: 19.0,
            },
            row_errors: vec![],
            rows_read: 1,
            rows_used: 1,
            note: None,
        };
        let outcome = FitOutcome {
            params: params(),
            quality: FitQuality { sse: 0.125, rmse: 0.353, n: 1 },
            solver: SolverReport {
                converged: true,
                iterations: 42,
                objective: 0.125,
                continuity_gap: 1e-9,
                slope_gap: -1e-9,
                message: "converged".to_string(),
            },
        };
        let config = FitConfig {
            data_path: "data.csv".into(),
            coeff_guess: 0.5,
            x0_guess: None,
            coeff_bound: 50.0,
            x0_min: 0.0,
            x0_max: None,
            max_iters: 500,
            tol: 1e-9,
            ctol: 1e-6,
            starts: 1,
            plot: true,
            plot_width: 100,
            plot_height: 25,
            export_results: None,
            export_curve: None,
        };

        let text = format_run_summary(&ingest, 1234.5, &outcome, &config);
        assert!(text.contains("Initial objective: 1234.5"));
        assert!(text.contains("success   : true"));
        assert!(text.contains("iterations: 42"));
        assert!(text.contains("Final objective: 0.125"));
        assert!(text.contains("a1=1.000000"));
        assert!(text.contains("b2=5.000000"));
        assert!(text.contains("x0=2.000000"));
    }

    #[test]
    fn residual_table_has_one_row_per_sample() {
        let samples = vec![
            Sample { x: 0.0, y: 0.0 },
            Sample { x: 4.0, y: 14.0 },
        ];
        let residuals = compute_residuals(&samples, &params()).unwrap();
        let table = format_residual_table(&residuals);
        // Header + rule + two data rows.
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("seg2"));
    }
}
