//! Input/output helpers.
//!
//! - two-column sample ingest + validation (`ingest`)
//! - per-sample result export (`export`)
//! - curve JSON read/write (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;
