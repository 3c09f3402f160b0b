// src/sites/blu.rs

//! Blutopia adapter.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    CandidateGroup, ExternalId, Identity, Lookup, MediaRelease, RemoteListing, TitleSearch,
};
use crate::pipeline::{CandidateScan, ScanItem, row_origin};
use crate::sites::{
    DestinationAdapter, Site, SourceAdapter, base_url, parse_selector, select_text,
};
use crate::utils::http::fetch_text;
use crate::utils::is_on_domain;
use crate::utils::parse::{parse_size, parse_title_year};

const NAME: &str = "BLU";
const DOMAINS: [&str; 2] = ["blutopia.cc", "blutopia.xyz"];

#[derive(Clone)]
struct BluSelectors {
    results: Selector,
    row: Selector,
    name: Selector,
    size: Selector,
    no_result: Selector,
}

impl BluSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            results: parse_selector(".torrent-search--list__results")?,
            row: parse_selector(".torrent-search--list__results tbody tr")?,
            name: parse_selector(".torrent-search--list__name")?,
            size: parse_selector(".torrent-search--list__size")?,
            no_result: parse_selector(".torrent-listings-no-result")?,
        })
    }

    fn release(&self, row: &ElementRef<'_>) -> MediaRelease {
        let size = select_text(row, &self.size).and_then(|t| parse_size(&t));
        match select_text(row, &self.name) {
            Some(name) => MediaRelease::from_name(&name, size),
            None => MediaRelease {
                size,
                ..MediaRelease::default()
            },
        }
    }

    fn identity(&self, row: &ElementRef<'_>) -> Identity {
        // Rows without a linked title carry an id of 0.
        let id = row
            .value()
            .attr("data-imdb-id")
            .map(str::trim)
            .filter(|id| !id.is_empty() && id.chars().any(|c| c != '0'))
            .map(|id| ExternalId::new(format!("tt{id}")));
        let title_year = select_text(row, &self.name).and_then(|n| parse_title_year(&n));
        Identity::from_parts(
            id,
            title_year.as_ref().map(|t| t.title.as_str()),
            title_year.as_ref().map(|t| t.year),
        )
    }

    fn scan_row(&self, index: usize, row: ElementRef<'_>) -> ScanItem {
        let origin = row_origin(NAME, index);
        let release = self.release(&row).with_origin(origin.clone());
        match CandidateGroup::new(self.identity(&row), vec![release], None) {
            Ok(group) => ScanItem::Candidate(group),
            Err(_) => ScanItem::Skip(origin),
        }
    }

    fn parse_results(&self, html: &str) -> Result<Lookup> {
        let document = Html::parse_document(html);
        if document.select(&self.no_result).next().is_some() {
            return Ok(Lookup::NotFound {
                pending_requests: false,
            });
        }
        if document.select(&self.results).next().is_none() {
            return Err(AppError::site(NAME, "page has no torrent listing"));
        }

        let releases: Vec<MediaRelease> = document
            .select(&self.row)
            .map(|row| self.release(&row))
            .collect();
        if releases.is_empty() {
            return Ok(Lookup::NotFound {
                pending_requests: false,
            });
        }
        Ok(Lookup::Found(RemoteListing::new(releases)))
    }
}

/// Blutopia.
pub struct Blu {
    client: Client,
    base_url: String,
    selectors: BluSelectors,
}

impl Blu {
    pub fn new(client: Client, base: &str) -> Result<Self> {
        Ok(Self {
            client,
            base_url: base_url(base),
            selectors: BluSelectors::new()?,
        })
    }
}

impl Site for Blu {
    fn name(&self) -> &'static str {
        NAME
    }

    fn can_be_source(&self) -> bool {
        true
    }

    fn can_be_destination(&self) -> bool {
        true
    }

    fn matches_url(&self, url: &str) -> bool {
        DOMAINS.iter().any(|domain| is_on_domain(url, domain))
    }
}

impl SourceAdapter for Blu {
    fn scan<'a>(&self, document: &'a Html) -> CandidateScan<'a> {
        let rows: Vec<ElementRef<'a>> = document.select(&self.selectors.row).collect();
        let selectors = self.selectors.clone();
        CandidateScan::new(rows, move |index, row| selectors.scan_row(index, row))
    }
}

#[async_trait]
impl DestinationAdapter for Blu {
    async fn query_by_exact_id(&self, id: &ExternalId) -> Lookup {
        let url = format!(
            "{}/torrents?perPage=25&imdbId={}&sortField=size",
            self.base_url, id
        );
        match fetch_text(&self.client, &url)
            .await
            .and_then(|html| self.selectors.parse_results(&html))
        {
            Ok(lookup) => lookup,
            Err(e) => {
                log::warn!("[{NAME}] lookup for {id} failed: {e}");
                Lookup::Unresolved
            }
        }
    }

    async fn query_by_title_year(&self, _title: &str, _year: u16) -> TitleSearch {
        TitleSearch::Unsupported
    }
}
