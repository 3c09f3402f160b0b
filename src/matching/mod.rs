//! Matching of local releases against a destination's listing.
//!
//! - `rules`: stateless equivalence and policy predicates
//! - `engine`: the `Reconciler` that turns a group into an outcome

pub mod engine;
pub mod rules;

pub use engine::Reconciler;
