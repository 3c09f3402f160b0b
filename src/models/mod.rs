// src/models/mod.rs

//! Domain models for the finder.
//!
//! Releases and groups come out of a source scan, listings out of a
//! destination query, and outcomes out of the reconciliation engine.

mod config;
mod group;
mod listing;
mod outcome;
mod release;

// Re-export all public types
pub use config::{Config, HttpConfig, MatchingConfig, SitesConfig};
pub use group::{CandidateGroup, ExternalId, Identity};
pub use listing::{Lookup, RemoteListing, SearchMatch, TitleSearch};
pub use outcome::ReconciliationOutcome;
pub use release::{Category, MediaRelease, OriginRef, ReleaseVisibility, Resolution, Tag};
