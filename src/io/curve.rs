//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a fitted curve:
//! - the seven fitted parameters
//! - fit quality and the solver report
//! - a precomputed dense grid for quick re-plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CurveFile, CurveGrid, FitOutcome, PiecewiseParams};
use crate::error::AppError;
use crate::models::predict;

/// Grid density for the exported fitted curve.
const GRID_POINTS: usize = 1000;

/// Write a curve JSON file.
pub fn write_curve_json(
    path: &Path,
    outcome: &FitOutcome,
    x_min: f64,
    x_max: f64,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create curve JSON '{}': {e}", path.display()))
    })?;

    let (x, y) = build_grid(&outcome.params, x_min, x_max, GRID_POINTS);

    let curve = CurveFile {
        tool: "knee".to_string(),
        params: outcome.params,
        quality: outcome.quality.clone(),
        solver: outcome.solver.clone(),
        grid: CurveGrid { x, y },
    };

    serde_json::to_writer_pretty(file, &curve)
        .map_err(|e| AppError::new(2, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(2, format!("Failed to open curve JSON '{}': {e}", path.display()))
    })?;
    let curve: CurveFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(2, format!("Invalid curve JSON: {e}")))?;
    Ok(curve)
}

/// Dense fitted grid spanning `[x_min, x_max]`.
pub fn build_grid(params: &PiecewiseParams, x_min: f64, x_max: f64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let n = n.max(2);
    let mut x0 = x_min;
    let mut x1 = x_max;
    if !(x0.is_finite() && x1.is_finite()) || x1 <= x0 {
        x0 = 0.0;
        x1 = 1.0;
    }

    let mut xs = Vec::with_capacity(n);
    let mut ys = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = x0 + u * (x1 - x0);
        xs.push(x);
        ys.push(predict(x, params));
    }
    (xs, ys)
}
