//! What a destination site knows about one identity.

use serde::{Deserialize, Serialize};

use crate::models::MediaRelease;

/// The destination's known releases for one identity, in page order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteListing {
    pub releases: Vec<MediaRelease>,
}

impl RemoteListing {
    pub fn new(releases: Vec<MediaRelease>) -> Self {
        Self { releases }
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

/// Answer of a destination query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Lookup {
    /// A listing was produced.
    Found(RemoteListing),
    /// The destination confirmed it has nothing for this identity.
    NotFound { pending_requests: bool },
    /// The query could not be completed (network or page shape).
    Unresolved,
}

impl Lookup {
    /// Whether this answer may be remembered for the rest of the run.
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

/// One entry of a destination search result page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub title: String,
    pub year: Option<u16>,
    pub releases: Vec<MediaRelease>,
}

/// Answer of a title/year destination query.
#[derive(Debug, Clone, PartialEq)]
pub enum TitleSearch {
    /// The search resolved to a single title (or to nothing).
    Direct(Lookup),
    /// The search returned several titles.
    Ambiguous {
        matches: Vec<SearchMatch>,
        pending_requests: bool,
    },
    /// The destination has no title search.
    Unsupported,
}
