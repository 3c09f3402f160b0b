//! Storage for the finder.
//!
//! Nothing outlives a run: the only store is the in-memory session cache
//! of destination answers, handed explicitly to the reconciler.

pub mod cache;

// Re-export for convenience
pub use cache::SessionCache;
