// src/pipeline/check.rs

//! Check run: stream a source scan through the reconciler.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::matching::Reconciler;
use crate::models::{
    Category, Config, Identity, OriginRef, ReconciliationOutcome, ReleaseVisibility,
};
use crate::pipeline::ScanItem;
use crate::sites::DestinationAdapter;
use crate::storage::SessionCache;
use crate::utils::report;

/// Knobs for a single check run.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Stop after this many candidate groups.
    pub limit: Option<usize>,
}

/// Outcome of one candidate group, in scan order.
#[derive(Debug, Clone, Serialize)]
pub struct CheckEntry {
    pub identity: Identity,
    pub category: Option<Category>,
    pub release_count: usize,
    pub outcome: ReconciliationOutcome,
}

/// Summary of a check run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub source: String,
    pub destination: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Row count announced by the scan
    pub total_rows: Option<usize>,
    pub entries: Vec<CheckEntry>,
    /// Rows the source itself excluded
    pub skipped: usize,
    /// Rows to hide: skipped rows plus redundant releases
    pub hidden: Vec<OriginRef>,
    /// Whether the run stopped at the limit; no rows past that point are read
    pub stopped_early: bool,
}

impl CheckReport {
    /// Number of groups per outcome, omitting outcomes that never occurred.
    pub fn counts(&self) -> BTreeMap<ReconciliationOutcome, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.outcome).or_insert(0) += 1;
        }
        counts
    }

    pub fn upload_candidates(&self) -> impl Iterator<Item = &CheckEntry> {
        self.entries.iter().filter(|e| e.outcome.is_upload_candidate())
    }
}

/// Reconcile every candidate of a scan against `destination`.
///
/// Groups are handled one at a time in scan order with one session cache
/// for the whole run. The scan is consumed lazily; reaching the limit
/// drops it right after the last allowed group.
pub async fn run_check<I>(
    config: &Config,
    source: &str,
    scan: I,
    destination: &dyn DestinationAdapter,
    options: &CheckOptions,
) -> CheckReport
where
    I: IntoIterator<Item = ScanItem>,
{
    let started_at = Utc::now();
    report::header(&format!("Checking {} against {}", source, destination.name()));

    let reconciler = Reconciler::new(config.matching.clone());
    let delay = Duration::from_millis(config.http.request_delay_ms);
    let mut cache = SessionCache::new();
    let mut hidden: Vec<OriginRef> = Vec::new();
    let mut entries = Vec::new();
    let mut total_rows = None;
    let mut skipped = 0;
    let mut stopped_early = false;

    if options.limit == Some(0) {
        stopped_early = true;
    } else {
        for item in scan {
            match item {
                ScanItem::Progress { total } => {
                    total_rows = Some(total);
                    log::info!("{} rows to scan", total);
                }
                ScanItem::Skip(origin) => {
                    skipped += 1;
                    hidden.hide(&origin);
                    log::debug!("Skipped {}", origin);
                }
                ScanItem::Candidate(group) => {
                    if !entries.is_empty() && !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }

                    let outcome = reconciler
                        .reconcile(&group, destination, &mut cache, &mut hidden)
                        .await;
                    log::info!(
                        "{} {}: {}",
                        report::progress_label(entries.len() + 1, total_rows),
                        group.identity(),
                        outcome
                    );

                    entries.push(CheckEntry {
                        identity: group.identity().clone(),
                        category: group.category(),
                        release_count: group.releases().len(),
                        outcome,
                    });

                    if options.limit.is_some_and(|limit| entries.len() >= limit) {
                        log::info!("Limit of {} groups reached", entries.len());
                        stopped_early = true;
                        break;
                    }
                }
            }
        }
    }

    let check = CheckReport {
        source: source.to_string(),
        destination: destination.name().to_string(),
        started_at,
        finished_at: Utc::now(),
        total_rows,
        entries,
        skipped,
        hidden,
        stopped_early,
    };

    let mut items: Vec<(&str, String)> = check
        .counts()
        .into_iter()
        .map(|(outcome, count)| (outcome.as_str(), count.to_string()))
        .collect();
    items.push(("hidden rows", check.hidden.len().to_string()));
    items.push(("cached identities", cache.len().to_string()));
    report::summary("Check results", &items);

    check
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::models::{
        CandidateGroup, ExternalId, Lookup, MediaRelease, RemoteListing, TitleSearch,
    };
    use crate::pipeline::{CandidateScan, row_origin};
    use crate::sites::Site;

    /// Destination that knows one id and counts exact queries.
    struct OneTitle {
        queries: AtomicUsize,
    }

    impl Site for OneTitle {
        fn name(&self) -> &'static str {
            "ONE"
        }
        fn can_be_source(&self) -> bool {
            false
        }
        fn can_be_destination(&self) -> bool {
            true
        }
        fn matches_url(&self, _url: &str) -> bool {
            false
        }
    }

    #[async_trait]
    impl DestinationAdapter for OneTitle {
        async fn query_by_exact_id(&self, id: &ExternalId) -> Lookup {
            self.queries.fetch_add(1, Ordering::SeqCst);
            if id.as_str() == "tt1" {
                Lookup::Found(RemoteListing::new(vec![MediaRelease::from_name(
                    "Known.2001.1080p.BluRay.x264",
                    Some(8000.0),
                )]))
            } else {
                Lookup::NotFound {
                    pending_requests: false,
                }
            }
        }

        async fn query_by_title_year(&self, _title: &str, _year: u16) -> TitleSearch {
            TitleSearch::Unsupported
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.http.request_delay_ms = 0;
        config
    }

    fn candidate(id: &str, name: &str, index: usize) -> ScanItem {
        let release = MediaRelease::from_name(name, Some(8100.0)).with_origin(row_origin("T", index));
        ScanItem::Candidate(
            CandidateGroup::new(Identity::Exact(ExternalId::new(id)), vec![release], None).unwrap(),
        )
    }

    fn rows() -> Vec<ScanItem> {
        vec![
            candidate("tt1", "Known.2001.1080p.BluRay.x264", 0),
            ScanItem::Skip(row_origin("T", 1)),
            candidate("tt2", "Other.2002.1080p.BluRay.x264", 2),
            candidate("tt1", "Known.2001.1080p.WEB.x264", 3),
        ]
    }

    #[tokio::test]
    async fn test_run_check_collects_outcomes_in_order() {
        let destination = OneTitle {
            queries: AtomicUsize::new(0),
        };
        let scan = CandidateScan::new(rows(), |_, item| item);

        let check = run_check(&config(), "T", scan, &destination, &CheckOptions::default()).await;

        let outcomes: Vec<_> = check.entries.iter().map(|e| e.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                ReconciliationOutcome::Exist,
                ReconciliationOutcome::NotExist,
                ReconciliationOutcome::Exist,
            ]
        );
        assert_eq!(check.total_rows, Some(4));
        assert_eq!(check.skipped, 1);
        assert_eq!(
            check.hidden,
            vec![row_origin("T", 0), row_origin("T", 1), row_origin("T", 3)]
        );
        assert!(!check.stopped_early);
        assert_eq!(destination.queries.load(Ordering::SeqCst), 2);
        assert_eq!(check.counts()[&ReconciliationOutcome::Exist], 2);
        assert_eq!(check.upload_candidates().count(), 1);
    }

    #[tokio::test]
    async fn test_run_check_stops_at_limit() {
        let destination = OneTitle {
            queries: AtomicUsize::new(0),
        };
        let parsed = Cell::new(0);
        let scan = CandidateScan::new(rows(), |_, item| {
            parsed.set(parsed.get() + 1);
            item
        });
        let options = CheckOptions { limit: Some(1) };

        let check = run_check(&config(), "T", scan, &destination, &options).await;

        assert_eq!(check.entries.len(), 1);
        assert!(check.stopped_early);
        assert_eq!(check.skipped, 0);
        assert_eq!(check.hidden, vec![row_origin("T", 0)]);
        assert_eq!(parsed.get(), 1);
        assert_eq!(destination.queries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_check_limit_zero_reads_nothing() {
        let destination = OneTitle {
            queries: AtomicUsize::new(0),
        };
        let options = CheckOptions { limit: Some(0) };

        let check = run_check(&config(), "T", rows(), &destination, &options).await;

        assert!(check.entries.is_empty());
        assert!(check.stopped_early);
        assert_eq!(check.total_rows, None);
        assert_eq!(destination.queries.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_report_serializes() {
        let check = CheckReport {
            source: "HDB".into(),
            destination: "PTP".into(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            total_rows: Some(0),
            entries: vec![CheckEntry {
                identity: Identity::Exact(ExternalId::new("tt1")),
                category: Some(Category::Movie),
                release_count: 1,
                outcome: ReconciliationOutcome::NotExistWithRequest,
            }],
            skipped: 0,
            hidden: Vec::new(),
            stopped_early: false,
        };
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["entries"][0]["outcome"], "NOT_EXIST_WITH_REQUEST");
        assert_eq!(json["entries"][0]["identity"]["exact"], "tt1");
    }
}
