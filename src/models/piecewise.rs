//! Piecewise prediction.
//!
//! The curve is segment 1 for `x <= x0` and segment 2 for `x > x0`. Each
//! point is tagged with the segment that produced it, which keeps the
//! branch explicit and reusable for residual tables and plots.

use crate::domain::{PiecewiseParams, Segment};

/// Which segment covers `x`.
pub fn segment_of(x: f64, params: &PiecewiseParams) -> Segment {
    if x <= params.x0 {
        Segment::First
    } else {
        Segment::Second
    }
}

/// Predict `y(x)`.
pub fn predict(x: f64, params: &PiecewiseParams) -> f64 {
    match segment_of(x, params) {
        Segment::First => params.seg1.eval(x),
        Segment::Second => params.seg2.eval(x),
    }
}

/// Predict `y(x)` with the segment tag.
pub fn predict_tagged(x: f64, params: &PiecewiseParams) -> (f64, Segment) {
    let seg = segment_of(x, params);
    let y = match seg {
        Segment::First => params.seg1.eval(x),
        Segment::Second => params.seg2.eval(x),
    };
    (y, seg)
}

/// Vectorized prediction over a sequence of x values.
pub fn predict_many(xs: &[f64], params: &PiecewiseParams) -> Vec<f64> {
    xs.iter().map(|&x| predict(x, params)).collect()
}
