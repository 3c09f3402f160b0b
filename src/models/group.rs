//! Candidate groups and content identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Category, MediaRelease};

/// External content-database id (an IMDb `tt…` id in practice).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalId(String);

impl ExternalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The key that says two releases are the same content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    /// Exact match on an external id.
    Exact(ExternalId),
    /// Title and release year, only as good as the title normalization.
    Fuzzy { title: String, year: u16 },
    /// Neither form could be extracted.
    Unknown,
}

impl Identity {
    /// Pick the strongest identity available.
    ///
    /// An id wins over title/year; the fuzzy form needs both a non-empty
    /// title and a year.
    pub fn from_parts(id: Option<ExternalId>, title: Option<&str>, year: Option<u16>) -> Self {
        if let Some(id) = id.filter(|id| !id.as_str().trim().is_empty()) {
            return Self::Exact(id);
        }
        match (title.map(str::trim), year) {
            (Some(title), Some(year)) if !title.is_empty() => Self::Fuzzy {
                title: title.to_string(),
                year,
            },
            _ => Self::Unknown,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact(_))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(id) => write!(f, "{id}"),
            Self::Fuzzy { title, year } => write!(f, "{title} ({year})"),
            Self::Unknown => f.write_str("<unknown>"),
        }
    }
}

/// A set of local releases sharing one content identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateGroup {
    identity: Identity,
    releases: Vec<MediaRelease>,
    category: Option<Category>,
}

impl CandidateGroup {
    /// Create a group. The release list must not be empty.
    pub fn new(
        identity: Identity,
        releases: Vec<MediaRelease>,
        category: Option<Category>,
    ) -> Result<Self> {
        if releases.is_empty() {
            return Err(AppError::validation(format!(
                "candidate group {identity} has no releases"
            )));
        }
        Ok(Self {
            identity,
            releases,
            category,
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn releases(&self) -> &[MediaRelease] {
        &self.releases
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }
}
