// src/lib.rs

//! Unique Finder Library
//!
//! Reconciles releases scraped from a source tracker against what a
//! destination tracker already carries.

pub mod error;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod sites;
pub mod storage;
pub mod utils;
