//! Per-run memory of destination answers keyed by external id.

use std::collections::HashMap;

use crate::models::{ExternalId, Lookup};

/// Destination answers remembered for one run.
///
/// Only exact-id lookups are stored. Title/year answers depend on how the
/// destination resolved an ambiguous search and are never reused. There
/// is no eviction; drop the cache to forget.
#[derive(Debug, Default)]
pub struct SessionCache {
    entries: HashMap<ExternalId, Lookup>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ExternalId) -> Option<&Lookup> {
        self.entries.get(id)
    }

    /// Remember an answer. Unresolved answers are refused and `false` is returned.
    pub fn put(&mut self, id: ExternalId, lookup: Lookup) -> bool {
        if !lookup.is_cacheable() {
            return false;
        }
        self.entries.insert(id, lookup);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
