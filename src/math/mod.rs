//! Shared numerics: least-squares solves and finite differences.

pub mod diff;
pub mod lsq;

pub use diff::*;
pub use lsq::*;
