//! Constrained piecewise-quadratic fitting.
//!
//! - `problem`: objective, constraint gaps, augmented residual vector
//! - `solver`: the bounded equality-constrained minimizer
//! - `starts`: deterministic breakpoint start generation
//! - `fitter`: multi-start orchestration and result selection

pub mod fitter;
pub mod problem;
pub mod solver;
pub mod starts;

pub use fitter::*;
pub use problem::*;
pub use solver::*;
pub use starts::*;
