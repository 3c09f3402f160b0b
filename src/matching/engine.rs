// src/matching/engine.rs

//! Reconciliation engine.
//!
//! Decides, for one candidate group, whether the destination already
//! carries equivalent releases. Redundant local releases are reported to a
//! [`ReleaseVisibility`] sink so the caller can hide their rows.

use crate::matching::rules::{
    is_allowed_encoding, is_eligible_category, is_similar, sizes_distinct,
};
use crate::models::{
    CandidateGroup, ExternalId, Identity, Lookup, MatchingConfig, MediaRelease,
    ReconciliationOutcome, ReleaseVisibility, RemoteListing, TitleSearch,
};
use crate::sites::DestinationAdapter;
use crate::storage::SessionCache;

/// Reconciles candidate groups against a destination.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    policy: MatchingConfig,
}

impl Reconciler {
    pub fn new(policy: MatchingConfig) -> Self {
        Self { policy }
    }

    /// Produce the outcome for one group.
    ///
    /// Exact-id answers are read from and written to `cache`; title/year
    /// answers bypass it. Never fails: every input maps to an outcome.
    pub async fn reconcile(
        &self,
        group: &CandidateGroup,
        destination: &dyn DestinationAdapter,
        cache: &mut SessionCache,
        visibility: &mut dyn ReleaseVisibility,
    ) -> ReconciliationOutcome {
        let identity = group.identity();

        if !is_eligible_category(group.category(), &self.policy.allowed_categories) {
            log::debug!("{identity}: category {:?} not allowed", group.category());
            return ReconciliationOutcome::NotAllowed;
        }

        let allowed: Vec<&MediaRelease> = group
            .releases()
            .iter()
            .filter(|release| is_allowed_encoding(release))
            .collect();
        if allowed.is_empty() {
            log::debug!("{identity}: only non-HDR x265 below UHD, not allowed");
            return ReconciliationOutcome::NotAllowed;
        }

        let lookup = match identity {
            Identity::Exact(id) => Self::lookup_exact(id, destination, cache).await,
            Identity::Fuzzy { title, year } => {
                match Self::lookup_fuzzy(title, *year, destination).await {
                    Some(lookup) => lookup,
                    None => return ReconciliationOutcome::NotChecked,
                }
            }
            Identity::Unknown => return ReconciliationOutcome::NotChecked,
        };

        match lookup {
            Lookup::Found(listing) => self.compare(&allowed, &listing, visibility),
            Lookup::NotFound { pending_requests } => {
                Self::missing(identity.is_exact(), pending_requests)
            }
            Lookup::Unresolved => Self::missing(identity.is_exact(), false),
        }
    }

    async fn lookup_exact(
        id: &ExternalId,
        destination: &dyn DestinationAdapter,
        cache: &mut SessionCache,
    ) -> Lookup {
        if let Some(lookup) = cache.get(id) {
            log::debug!("{id}: using cached {} answer", destination.name());
            return lookup.clone();
        }
        let lookup = destination.query_by_exact_id(id).await;
        if !cache.put(id.clone(), lookup.clone()) {
            log::debug!("{id}: unresolved answer not cached");
        }
        lookup
    }

    /// `None` when the destination cannot search by title.
    async fn lookup_fuzzy(
        title: &str,
        year: u16,
        destination: &dyn DestinationAdapter,
    ) -> Option<Lookup> {
        match destination.query_by_title_year(title, year).await {
            TitleSearch::Direct(lookup) => Some(lookup),
            TitleSearch::Ambiguous {
                matches,
                pending_requests,
            } => {
                log::debug!("{title} ({year}): {} search results", matches.len());
                let exact = matches
                    .into_iter()
                    .find(|m| m.title.trim() == title && m.year == Some(year));
                Some(match exact {
                    Some(m) if !m.releases.is_empty() => {
                        log::debug!("{title} ({year}): exact title match found");
                        Lookup::Found(RemoteListing::new(m.releases))
                    }
                    _ => Lookup::NotFound { pending_requests },
                })
            }
            TitleSearch::Unsupported => {
                log::debug!("{} has no title search", destination.name());
                None
            }
        }
    }

    fn missing(exact: bool, pending_requests: bool) -> ReconciliationOutcome {
        match (exact, pending_requests) {
            (true, true) => ReconciliationOutcome::NotExistWithRequest,
            (true, false) => ReconciliationOutcome::NotExist,
            (false, true) => ReconciliationOutcome::MaybeNotExistWithRequest,
            (false, false) => ReconciliationOutcome::MaybeNotExist,
        }
    }

    fn compare(
        &self,
        releases: &[&MediaRelease],
        listing: &RemoteListing,
        visibility: &mut dyn ReleaseVisibility,
    ) -> ReconciliationOutcome {
        let mut missing_slot = false;
        for local in releases {
            let similar: Vec<&MediaRelease> = listing
                .releases
                .iter()
                .filter(|remote| is_similar(local, remote))
                .collect();

            if self.is_redundant(local, &similar) {
                if let Some(origin) = &local.origin {
                    visibility.hide(origin);
                }
            } else {
                missing_slot = true;
            }
        }

        if missing_slot {
            ReconciliationOutcome::ExistButMissingSlot
        } else {
            ReconciliationOutcome::Exist
        }
    }

    /// Whether uploading `local` would add nothing over `similar`.
    fn is_redundant(&self, local: &MediaRelease, similar: &[&MediaRelease]) -> bool {
        let redundant = match similar {
            [] => local.resolution.is_none() || local.codec.is_none(),
            [remote] => match (local.size, remote.size) {
                (Some(a), Some(b)) => !sizes_distinct(a, b, self.policy.size_ratio),
                _ => true,
            },
            _ => true,
        };
        log::debug!(
            "{} {} ({} similar): {}",
            local.resolution.as_ref().map_or("?".to_string(), |r| r.to_string()),
            local.codec.as_deref().unwrap_or("?"),
            similar.len(),
            if redundant { "redundant" } else { "new slot" }
        );
        redundant
    }
}
