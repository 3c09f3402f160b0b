// src/sites/ptp.rs

//! PassThePopcorn adapter: browse pages as a source, id and title search
//! as a destination.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    CandidateGroup, Category, ExternalId, Identity, Lookup, MediaRelease, RemoteListing,
    Resolution, SearchMatch, Tag, TitleSearch,
};
use crate::pipeline::{CandidateScan, ScanItem, release_origin, row_origin};
use crate::sites::{
    DestinationAdapter, Site, SourceAdapter, base_url, element_text, parse_selector, select_text,
};
use crate::utils::http::fetch_text;
use crate::utils::is_on_domain;
use crate::utils::parse::{parse_imdb_id_from_href, parse_resolution, parse_size};

const NAME: &str = "PTP";
const DOMAIN: &str = "passthepopcorn.me";
const REQUESTS_NOTICE: &str =
    "did not match any torrents, however it did match these requests";
const PAGE_DATA_MARKER: &str = "var PageData =";

/// Browse page layouts, tried in order; the first one present wins.
const MOVIE_VIEWS: [&str; 3] = [
    "#torrents-movie-view table.torrent_table > tbody",
    "table.torrent_table > tbody tr.basic-movie-list__details-row",
    ".cover-movie-list__movie",
];

/// The `PageData` blob embedded in search result pages.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PageData {
    #[serde(default)]
    movies: Vec<PageMovie>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PageMovie {
    title: String,
    #[serde(default)]
    year: Value,
    #[serde(default)]
    grouping_qualities: Vec<PageQuality>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PageQuality {
    #[serde(default)]
    torrents: Vec<PageTorrent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PageTorrent {
    title: String,
    #[serde(default)]
    size: Value,
}

impl PageMovie {
    fn year(&self) -> Option<u16> {
        match &self.year {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_u64().and_then(|y| u16::try_from(y).ok()),
            _ => None,
        }
    }

    fn into_match(self) -> SearchMatch {
        let year = self.year();
        let releases = self
            .grouping_qualities
            .into_iter()
            .flat_map(|q| q.torrents)
            .map(|t| {
                let size = size_from_json(&t.size);
                MediaRelease::from_name(&t.title, size)
            })
            .collect();
        SearchMatch {
            title: self.title.trim().to_string(),
            year,
            releases,
        }
    }
}

/// Size as printed ("8.02 GiB") or as a raw byte count.
fn size_from_json(value: &Value) -> Option<f64> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    parse_size(&text).or_else(|| {
        text.trim()
            .parse::<f64>()
            .ok()
            .map(|bytes| bytes / (1024.0 * 1024.0))
            .filter(|mb| *mb > 0.0)
    })
}

/// Pull the `var PageData = {...};` object out of a page's scripts.
fn extract_page_data(document: &Html, script: &Selector) -> Result<PageData> {
    let content = document
        .select(script)
        .map(|s| s.text().collect::<String>())
        .find(|text| text.contains(PAGE_DATA_MARKER))
        .ok_or_else(|| AppError::site(NAME, "no PageData script on result page"))?;
    let start = content
        .find(PAGE_DATA_MARKER)
        .map(|i| i + PAGE_DATA_MARKER.len())
        .unwrap_or_default();
    let json = content[start..].trim().trim_end_matches(';');
    Ok(serde_json::from_str(json)?)
}

struct PtpSelectors {
    row: Selector,
    no_results: Selector,
    results_count: Selector,
    script: Selector,
}

impl PtpSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            row: parse_selector(r#"#torrent-table tr[id^="group_torrent_header_"]"#)?,
            no_results: parse_selector("#no_results_message")?,
            results_count: parse_selector("span.search-form__footer__results")?,
            script: parse_selector("script")?,
        })
    }

    fn has_requests(&self, document: &Html) -> bool {
        document
            .select(&self.no_results)
            .next()
            .is_some_and(|e| element_text(&e).contains(REQUESTS_NOTICE))
    }

    /// Torrent rows of a single movie page.
    fn torrents(&self, document: &Html) -> Vec<MediaRelease> {
        document
            .select(&self.row)
            .filter_map(|row| parse_torrent_row(&row))
            .collect()
    }

    fn movie_page(&self, document: &Html) -> Lookup {
        let releases = self.torrents(document);
        if releases.is_empty() {
            Lookup::NotFound {
                pending_requests: self.has_requests(document),
            }
        } else {
            Lookup::Found(RemoteListing::new(releases))
        }
    }

    fn parse_exact(&self, html: &str) -> Lookup {
        self.movie_page(&Html::parse_document(html))
    }

    fn parse_search(&self, html: &str) -> Result<TitleSearch> {
        let document = Html::parse_document(html);
        let Some(count) = document.select(&self.results_count).next() else {
            return Ok(TitleSearch::Direct(self.movie_page(&document)));
        };
        log::debug!("[{NAME}] Multiple results found: {}", element_text(&count));

        let data = extract_page_data(&document, &self.script)?;
        Ok(TitleSearch::Ambiguous {
            matches: data.movies.into_iter().map(PageMovie::into_match).collect(),
            pending_requests: self.has_requests(&document),
        })
    }
}

/// One `group_torrent_header_` row: "[..] codec / container / source / resolution"
/// in the first cell and the size in the second.
fn parse_torrent_row(row: &ElementRef<'_>) -> Option<MediaRelease> {
    let mut cells = row.children().filter_map(ElementRef::wrap);
    let info = element_text(&cells.next()?);
    let size = cells.next().and_then(|cell| parse_size(&element_text(&cell)));

    let fields: Vec<&str> = info.split('/').map(str::trim).collect();
    let codec = fields
        .first()
        .and_then(|f| f.rsplit(']').next())
        .and_then(|f| f.split_whitespace().last())
        .map(str::to_string);
    let resolution = fields.get(3).and_then(|r| Resolution::from_raw(r));

    let mut release = MediaRelease {
        size,
        resolution,
        codec,
        ..MediaRelease::default()
    };
    if element_text(row).contains("Remux") {
        release.tags.insert(Tag::Remux);
    }
    Some(release)
}

/// Selectors for browse pages, where every movie lists its torrents.
#[derive(Clone)]
struct BrowseSelectors {
    views: Vec<Selector>,
    torrent_row: Selector,
    edition: Selector,
    edition_title: Selector,
    info_link: Selector,
    ratings: Selector,
    imdb: Selector,
    title: Selector,
    year: Selector,
}

impl BrowseSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            views: MOVIE_VIEWS
                .iter()
                .map(|view| parse_selector(view))
                .collect::<Result<_>>()?,
            torrent_row: parse_selector("tr.basic-movie-list__torrent-row")?,
            edition: parse_selector(".basic-movie-list__torrent-edition")?,
            edition_title: parse_selector(".basic-movie-list__torrent-edition__main")?,
            info_link: parse_selector(".torrent-info-link")?,
            ratings: parse_selector(
                ".basic-movie-list__movie__ratings-and-tags, .cover-movie-list__movie__rating-and-tags",
            )?,
            imdb: parse_selector(r#"a[href*="imdb.com/title/"]"#)?,
            title: parse_selector(".basic-movie-list__movie__title")?,
            year: parse_selector(".basic-movie-list__movie__year")?,
        })
    }

    fn movies<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        self.views
            .iter()
            .map(|view| document.select(view).collect::<Vec<_>>())
            .find(|movies| !movies.is_empty())
            .unwrap_or_default()
    }

    fn category(&self, movie: &ElementRef<'_>) -> Option<Category> {
        let edition = select_text(movie, &self.edition_title)?;
        Some(if edition.contains("Stand-up Comedy") {
            Category::StandUp
        } else if edition.contains("Live Performance") {
            Category::LivePerformance
        } else {
            Category::Movie
        })
    }

    fn identity(&self, movie: &ElementRef<'_>) -> Identity {
        let id = movie.select(&self.ratings).next().and_then(|cell| {
            cell.select(&self.imdb)
                .find_map(|a| a.value().attr("href").and_then(parse_imdb_id_from_href))
        });
        let title = select_text(movie, &self.title);
        let year = select_text(movie, &self.year)
            .and_then(|y| y.trim_matches(['[', ']', '(', ')']).trim().parse().ok());
        Identity::from_parts(id, title.as_deref(), year)
    }

    /// Torrent rows of one movie; edition header rows are not torrents.
    fn releases(&self, index: usize, movie: &ElementRef<'_>) -> Vec<MediaRelease> {
        movie
            .select(&self.torrent_row)
            .filter(|row| row.select(&self.edition).next().is_none())
            .enumerate()
            .filter_map(|(n, row)| {
                let title = select_text(&row, &self.info_link)?;
                let size = row
                    .children()
                    .filter_map(ElementRef::wrap)
                    .nth(2)
                    .and_then(|cell| parse_size(&element_text(&cell)));
                let mut release = MediaRelease {
                    size,
                    resolution: parse_resolution(&title),
                    ..MediaRelease::default()
                };
                if title.contains("Remux") {
                    release.tags.insert(Tag::Remux);
                }
                Some(release.with_origin(release_origin(NAME, index, n)))
            })
            .collect()
    }

    fn scan_movie(&self, index: usize, movie: ElementRef<'_>) -> ScanItem {
        let category = self.category(&movie);
        let releases = self
            .releases(index, &movie)
            .into_iter()
            .map(|release| release.with_category(category))
            .collect();
        match CandidateGroup::new(self.identity(&movie), releases, category) {
            Ok(group) => ScanItem::Candidate(group),
            Err(_) => {
                log::debug!("[{NAME}] movie {index} lists no torrents, skipping");
                ScanItem::Skip(row_origin(NAME, index))
            }
        }
    }
}

/// PassThePopcorn.
pub struct Ptp {
    client: Client,
    base_url: String,
    selectors: PtpSelectors,
    browse: BrowseSelectors,
}

impl Ptp {
    pub fn new(client: Client, base: &str) -> Result<Self> {
        Ok(Self {
            client,
            base_url: base_url(base),
            selectors: PtpSelectors::new()?,
            browse: BrowseSelectors::new()?,
        })
    }

    fn search_url(&self, title: &str, year: u16) -> Result<String> {
        let mut url = Url::parse(&format!("{}/torrents.php", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("action", "advanced")
            .append_pair("searchstr", title)
            .append_pair("year", &year.to_string());
        Ok(url.to_string())
    }
}

impl Site for Ptp {
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

impl SourceAdapter for Ptp {
    fn scan<'a>(&self, document: &'a Html) -> CandidateScan<'a> {
        let movies = self.browse.movies(document);
        let browse = self.browse.clone();
        CandidateScan::new(movies, move |index, movie| browse.scan_movie(index, movie))
    }
}

#[async_trait]
impl DestinationAdapter for Ptp {
    async fn query_by_exact_id(&self, id: &ExternalId) -> Lookup {
        let url = format!("{}/torrents.php?imdb={}", self.base_url, id);
        match fetch_text(&self.client, &url).await {
            Ok(html) => self.selectors.parse_exact(&html),
            Err(e) => {
                log::warn!("[{NAME}] lookup for {id} failed: {e}");
                Lookup::Unresolved
            }
        }
    }

    async fn query_by_title_year(&self, title: &str, year: u16) -> TitleSearch {
        log::debug!("[{NAME}] Searching by title and year: {title} - {year}");
        let html = match self.search_url(title, year) {
            Ok(url) => fetch_text(&self.client, &url).await,
            Err(e) => Err(e),
        };
        match html.and_then(|html| self.selectors.parse_search(&html)) {
            Ok(search) => search,
            Err(e) => {
                log::warn!("[{NAME}] search for {title} ({year}) failed: {e}");
                TitleSearch::Direct(Lookup::Unresolved)
            }
        }
    }
}
