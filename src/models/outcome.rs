//! Reconciliation outcome.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Verdict for one candidate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconciliationOutcome {
    /// No identity was available to query with.
    NotChecked,
    /// Category or encoding policy excludes the group.
    NotAllowed,
    /// Every release is already covered by the destination.
    Exist,
    /// The title exists but at least one release fills an empty slot.
    ExistButMissingSlot,
    NotExist,
    NotExistWithRequest,
    /// Not found by title/year, which is weaker evidence than an id miss.
    MaybeNotExist,
    MaybeNotExistWithRequest,
}

impl ReconciliationOutcome {
    pub const ALL: [Self; 8] = [
        Self::NotChecked,
        Self::NotAllowed,
        Self::Exist,
        Self::ExistButMissingSlot,
        Self::NotExist,
        Self::NotExistWithRequest,
        Self::MaybeNotExist,
        Self::MaybeNotExistWithRequest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotChecked => "NOT_CHECKED",
            Self::NotAllowed => "NOT_ALLOWED",
            Self::Exist => "EXIST",
            Self::ExistButMissingSlot => "EXIST_BUT_MISSING_SLOT",
            Self::NotExist => "NOT_EXIST",
            Self::NotExistWithRequest => "NOT_EXIST_WITH_REQUEST",
            Self::MaybeNotExist => "MAYBE_NOT_EXIST",
            Self::MaybeNotExistWithRequest => "MAYBE_NOT_EXIST_WITH_REQUEST",
        }
    }

    /// Whether the group is worth offering for upload.
    pub fn is_upload_candidate(&self) -> bool {
        matches!(
            self,
            Self::ExistButMissingSlot
                | Self::NotExist
                | Self::NotExistWithRequest
                | Self::MaybeNotExist
                | Self::MaybeNotExistWithRequest
        )
    }
}

impl fmt::Display for ReconciliationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
