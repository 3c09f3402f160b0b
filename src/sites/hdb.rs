// src/sites/hdb.rs

//! HDBits adapter: browse pages as a source, id search as a destination.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    CandidateGroup, Category, ExternalId, Identity, Lookup, MediaRelease, RemoteListing,
    TitleSearch,
};
use crate::pipeline::{CandidateScan, ScanItem, row_origin};
use crate::sites::{
    DestinationAdapter, Site, SourceAdapter, base_url, element_text, parse_selector, select_text,
};
use crate::utils::http::fetch_text;
use crate::utils::is_on_domain;
use crate::utils::parse::{parse_imdb_id, parse_release_name, parse_size, parse_title_year};

const NAME: &str = "HDB";
const DOMAIN: &str = "hdbits.org";

#[derive(Clone)]
struct HdbSelectors {
    row: Selector,
    exclusive: Selector,
    imdb: Selector,
    name: Selector,
    category: Selector,
    size: Selector,
    results_area: Selector,
}

impl HdbSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            row: parse_selector("#torrent-list > tbody tr")?,
            exclusive: parse_selector(r#"a[href="/browse.php?exclusive=1"]"#)?,
            imdb: parse_selector("a[data-imdb-link]")?,
            name: parse_selector(".browse_td_name_cell a")?,
            category: parse_selector(".catcell a")?,
            size: parse_selector("td:nth-child(6)")?,
            results_area: parse_selector("#resultsarea")?,
        })
    }

    /// Release described by a browse row, `None` for rows without a name.
    fn release(&self, row: &ElementRef<'_>) -> Option<MediaRelease> {
        let name = select_text(row, &self.name)?;
        let size = select_text(row, &self.size).and_then(|t| parse_size(&t));
        Some(MediaRelease::from_name(&name, size).with_category(self.category(row)))
    }

    fn category(&self, row: &ElementRef<'_>) -> Option<Category> {
        let href = row.select(&self.category).next()?.value().attr("href")?;
        let (_, id) = href.split_once("cat=")?;
        let id: String = id.chars().take_while(char::is_ascii_digit).collect();
        match id.as_str() {
            "1" => Some(Category::Movie),
            "2" => Some(Category::Tv),
            "3" => Some(Category::Documentary),
            "4" | "6" => Some(Category::Music),
            "5" => Some(Category::Sport),
            "7" => Some(Category::Xxx),
            _ => None,
        }
    }

    fn identity(&self, row: &ElementRef<'_>) -> Identity {
        let id = row
            .select(&self.imdb)
            .next()
            .and_then(|a| a.value().attr("data-imdb-link"))
            .and_then(parse_imdb_id);
        let title_year = select_text(row, &self.name)
            .and_then(|name| parse_title_year(&name).or_else(|| parse_release_name(&name)));
        Identity::from_parts(
            id,
            title_year.as_ref().map(|t| t.title.as_str()),
            title_year.as_ref().map(|t| t.year),
        )
    }

    fn scan_row(&self, index: usize, row: ElementRef<'_>) -> ScanItem {
        let origin = row_origin(NAME, index);
        if row.select(&self.exclusive).next().is_some() {
            log::debug!("[{NAME}] row {index} is exclusive, skipping");
            return ScanItem::Skip(origin);
        }
        let Some(release) = self.release(&row) else {
            log::debug!("[{NAME}] row {index} has no torrent name, skipping");
            return ScanItem::Skip(origin);
        };
        let category = release.category;
        let release = release.with_origin(origin.clone());
        match CandidateGroup::new(self.identity(&row), vec![release], category) {
            Ok(group) => ScanItem::Candidate(group),
            Err(_) => ScanItem::Skip(origin),
        }
    }

    fn parse_results(&self, html: &str) -> Result<Lookup> {
        let document = Html::parse_document(html);
        let area = document
            .select(&self.results_area)
            .next()
            .ok_or_else(|| AppError::site(NAME, "page has no results area"))?;
        if element_text(&area).contains("Nothing here!") {
            return Ok(Lookup::NotFound {
                pending_requests: false,
            });
        }

        let releases: Vec<MediaRelease> = document
            .select(&self.row)
            .filter_map(|row| self.release(&row))
            .collect();
        if releases.is_empty() {
            return Ok(Lookup::NotFound {
                pending_requests: false,
            });
        }
        Ok(Lookup::Found(RemoteListing::new(releases)))
    }
}

/// HDBits.
pub struct Hdb {
    client: Client,
    base_url: String,
    selectors: HdbSelectors,
}

impl Hdb {
    pub fn new(client: Client, base: &str) -> Result<Self> {
        Ok(Self {
            client,
            base_url: base_url(base),
            selectors: HdbSelectors::new()?,
        })
    }
}

impl Site for Hdb {
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
        is_on_domain(url, DOMAIN)
    }
}

impl SourceAdapter for Hdb {
    fn scan<'a>(&self, document: &'a Html) -> CandidateScan<'a> {
        let rows: Vec<ElementRef<'a>> = document.select(&self.selectors.row).collect();
        let selectors = self.selectors.clone();
        CandidateScan::new(rows, move |index, row| selectors.scan_row(index, row))
    }
}

#[async_trait]
impl DestinationAdapter for Hdb {
    async fn query_by_exact_id(&self, id: &ExternalId) -> Lookup {
        let url = format!(
            "{}/browse.php?c3=1&c1=1&c2=1&tagsearchtype=or&imdb={}&sort=size&h=8&d=DESC",
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
