// src/sites/hdt.rs

//! HD-Torrents adapter (source only).

use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::models::{CandidateGroup, Identity, MediaRelease};
use crate::pipeline::{CandidateScan, ScanItem, row_origin};
use crate::sites::{Site, SourceAdapter, element_text, parse_selector, select_text};
use crate::utils::is_on_domain;
use crate::utils::parse::{parse_imdb_id_from_href, parse_release_name, parse_size, parse_title_year};

const NAME: &str = "HDT";
const DOMAIN: &str = "hd-torrents.org";

/// Column holding the torrent size.
const SIZE_COLUMN: usize = 7;

#[derive(Clone)]
struct HdtSelectors {
    row: Selector,
    details: Selector,
    imdb: Selector,
}

impl HdtSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            row: parse_selector("table.mainblockcontenttt tr")?,
            details: parse_selector(r#"a[href^="details.php?id="]"#)?,
            imdb: parse_selector(r#"a[href*="imdb.com/title/"]"#)?,
        })
    }

    fn is_torrent_row(&self, row: &ElementRef<'_>) -> bool {
        row.select(&self.details).next().is_some()
    }

    fn scan_row(&self, index: usize, row: ElementRef<'_>) -> ScanItem {
        let origin = row_origin(NAME, index);
        let size = row
            .children()
            .filter_map(ElementRef::wrap)
            .nth(SIZE_COLUMN)
            .and_then(|cell| parse_size(&element_text(&cell)));
        let name = select_text(&row, &self.details).unwrap_or_default();

        let id = row
            .select(&self.imdb)
            .find_map(|a| a.value().attr("href").and_then(parse_imdb_id_from_href));
        let title_year = parse_release_name(&name).or_else(|| parse_title_year(&name));
        let identity = Identity::from_parts(
            id,
            title_year.as_ref().map(|t| t.title.as_str()),
            title_year.as_ref().map(|t| t.year),
        );

        let release = MediaRelease::from_name(&name, size).with_origin(origin.clone());
        match CandidateGroup::new(identity, vec![release], None) {
            Ok(group) => ScanItem::Candidate(group),
            Err(_) => ScanItem::Skip(origin),
        }
    }
}

/// HD-Torrents.
pub struct Hdt {
    selectors: HdtSelectors,
}

impl Hdt {
    pub fn new() -> Result<Self> {
        Ok(Self {
            selectors: HdtSelectors::new()?,
        })
    }
}

impl Site for Hdt {
    fn name(&self) -> &'static str {
        NAME
    }

    fn can_be_source(&self) -> bool {
        true
    }

    fn can_be_destination(&self) -> bool {
        false
    }

    fn matches_url(&self, url: &str) -> bool {
        is_on_domain(url, DOMAIN)
    }
}

impl SourceAdapter for Hdt {
    fn scan<'a>(&self, document: &'a Html) -> CandidateScan<'a> {
        let rows: Vec<ElementRef<'a>> = document
            .select(&self.selectors.row)
            .filter(|row| self.selectors.is_torrent_row(row))
            .collect();
        let selectors = self.selectors.clone();
        CandidateScan::new(rows, move |index, row| selectors.scan_row(index, row))
    }
}
