//! `knee-fit` library crate.
//!
//! Fits a continuous two-segment piecewise quadratic (joined at an unknown
//! breakpoint) to `(x, y)` samples by constrained nonlinear least squares.
//!
//! The binary (`knee`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fit pipeline is reusable independently of the CLI front-end

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
