//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observation samples and dataset stats
//! - the piecewise-quadratic parameter vector and its box bounds
//! - run configuration (`FitConfig`)
//! - fit outputs (`FitOutcome`, `SolverReport`, `CurveFile`, etc.)

pub mod types;

pub use types::*;
