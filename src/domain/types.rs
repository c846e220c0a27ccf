//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they
//! can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Number of free parameters: two quadratics plus the breakpoint.
pub const PARAM_LEN: usize = 7;

/// One observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

/// Summary stats about the samples actually used for fitting.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

/// One quadratic segment `a x^2 + b x + c`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quadratic {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Quadratic {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.a * x * x + self.b * x + self.c
    }

    /// First derivative `2 a x + b`.
    pub fn slope(&self, x: f64) -> f64 {
        2.0 * self.a * x + self.b
    }
}

/// Which segment of the piecewise curve produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    First,
    Second,
}

impl Segment {
    pub fn label(&self) -> &'static str {
        match self {
            Segment::First => "seg1",
            Segment::Second => "seg2",
        }
    }
}

/// The full 7-parameter vector of the piecewise model.
///
/// Flat layout (solver order): `[a1, b1, c1, a2, b2, c2, x0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PiecewiseParams {
    pub seg1: Quadratic,
    pub seg2: Quadratic,
    pub x0: f64,
}

impl PiecewiseParams {
    pub fn new(seg1: Quadratic, seg2: Quadratic, x0: f64) -> Self {
        Self { seg1, seg2, x0 }
    }

    pub fn to_array(&self) -> [f64; PARAM_LEN] {
        [
            self.seg1.a,
            self.seg1.b,
            self.seg1.c,
            self.seg2.a,
            self.seg2.b,
            self.seg2.c,
            self.x0,
        ]
    }

    pub fn from_array(p: &[f64; PARAM_LEN]) -> Self {
        Self {
            seg1: Quadratic::new(p[0], p[1], p[2]),
            seg2: Quadratic::new(p[3], p[4], p[5]),
            x0: p[6],
        }
    }

    /// Build from a slice of length [`PARAM_LEN`].
    ///
    /// # Panics
    /// Panics if the slice is shorter than [`PARAM_LEN`]. Callers size the
    /// solver vector correctly.
    pub fn from_slice(p: &[f64]) -> Self {
        Self {
            seg1: Quadratic::new(p[0], p[1], p[2]),
            seg2: Quadratic::new(p[3], p[4], p[5]),
            x0: p[6],
        }
    }
}

/// Box bounds on the 7 parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBounds {
    pub lower: [f64; PARAM_LEN],
    pub upper: [f64; PARAM_LEN],
}

impl ParamBounds {
    /// Symmetric `[-coeff_bound, coeff_bound]` on all six coefficients and
    /// `[x0_min, x0_max]` on the breakpoint.
    pub fn new(coeff_bound: f64, x0_min: f64, x0_max: f64) -> Self {
        let cb = coeff_bound.abs();
        let mut lower = [-cb; PARAM_LEN];
        let mut upper = [cb; PARAM_LEN];
        lower[PARAM_LEN - 1] = x0_min.min(x0_max);
        upper[PARAM_LEN - 1] = x0_min.max(x0_max);
        Self { lower, upper }
    }

    /// Project a parameter vector onto the box.
    pub fn clamp(&self, p: &[f64; PARAM_LEN]) -> [f64; PARAM_LEN] {
        let mut out = *p;
        for i in 0..PARAM_LEN {
            out[i] = out[i].clamp(self.lower[i], self.upper[i]);
        }
        out
    }

    pub fn contains(&self, p: &[f64; PARAM_LEN]) -> bool {
        (0..PARAM_LEN).all(|i| p[i] >= self.lower[i] && p[i] <= self.upper[i])
    }
}

/// Explicit run configuration.
///
/// Replaces the module-level globals a quick script would use: everything the
/// pipeline needs flows in through this struct and back out through
/// `RunOutput`.
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub data_path: PathBuf,
    /// Initial guess applied to all six coefficients.
    pub coeff_guess: f64,
    /// Initial breakpoint guess; `None` means the midpoint of the x range.
    pub x0_guess: Option<f64>,
    pub coeff_bound: f64,
    pub x0_min: f64,
    /// Upper bound on the breakpoint; `None` means the sample count.
    pub x0_max: Option<f64>,
    pub max_iters: usize,
    /// Tolerance on successive objective/step improvement.
    pub tol: f64,
    /// Feasibility tolerance on each constraint gap.
    pub ctol: f64,
    /// Number of breakpoint starts (1 = single fixed guess).
    pub starts: usize,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
}

/// Aggregate fit quality over the sample set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
}

/// Terminal state of one constrained solve.
///
/// Non-convergence is not fatal: the best iterate found is still returned
/// and used downstream, flagged via `converged`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverReport {
    pub converged: bool,
    pub iterations: usize,
    /// Final objective (sum of squared residuals) at the returned vector.
    pub objective: f64,
    /// `seg1(x0) - seg2(x0)` at the returned vector.
    pub continuity_gap: f64,
    /// `seg1'(x0) - seg2'(x0)` at the returned vector.
    pub slope_gap: f64,
    pub message: String,
}

impl SolverReport {
    /// Largest absolute constraint violation.
    pub fn constraint_norm(&self) -> f64 {
        self.continuity_gap.abs().max(self.slope_gap.abs())
    }
}

/// Everything the solver produced for one fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitOutcome {
    pub params: PiecewiseParams,
    pub quality: FitQuality,
    pub solver: SolverReport,
}

/// A sample together with its fitted value and residual.
#[derive(Debug, Clone)]
pub struct SampleResidual {
    pub sample: Sample,
    pub y_fit: f64,
    pub residual: f64,
    pub segment: Segment,
}

/// Dense fitted grid for plotting/export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Portable representation of a fitted curve:
/// parameters + quality + solver summary + a precomputed grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub params: PiecewiseParams,
    pub quality: FitQuality,
    pub solver: SolverReport,
    pub grid: CurveGrid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_array_round_trip() {
        let params = PiecewiseParams::new(
            Quadratic::new(1.0, -2.0, 3.0),
            Quadratic::new(-0.5, 4.0, 0.25),
            2.5,
        );
        let arr = params.to_array();
        assert_eq!(PiecewiseParams::from_array(&arr), params);
        assert_eq!(arr[6], 2.5);
    }

    #[test]
    fn bounds_clamp_projects_into_box() {
        let bounds = ParamBounds::new(50.0, 0.0, 6.0);
        let p = [80.0, -80.0, 0.0, 1.0, 2.0, 3.0, 9.5];
        let q = bounds.clamp(&p);
        assert_eq!(q[0], 50.0);
        assert_eq!(q[1], -50.0);
        assert_eq!(q[6], 6.0);
        assert!(bounds.contains(&q));
        assert!(!bounds.contains(&p));
    }

    #[test]
    fn quadratic_eval_and_slope() {
        let q = Quadratic::new(2.0, -1.0, 0.5);
        assert!((q.eval(3.0) - (18.0 - 3.0 + 0.5)).abs() < 1e-12);
        assert!((q.slope(3.0) - 11.0).abs() < 1e-12);
    }
}
