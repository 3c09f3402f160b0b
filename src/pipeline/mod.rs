//! Candidate pipeline.
//!
//! - `scan`: the lazy item stream a source adapter produces
//! - `check`: `run_check`, which feeds that stream through the reconciler

pub mod check;
pub mod scan;

pub use check::{CheckEntry, CheckOptions, CheckReport, run_check};
pub use scan::{CandidateScan, ScanItem, release_origin, row_origin};
