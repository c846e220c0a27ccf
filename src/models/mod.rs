//! The piecewise-quadratic model.
//!
//! The fitter relies on two primitive operations:
//! - predict `y(x)` given the 7-parameter vector (for residuals/plots)
//! - evaluate per-segment slopes (for the smoothness constraint)

pub mod piecewise;

pub use piecewise::*;
