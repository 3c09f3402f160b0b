//! Site adapters.
//!
//! Every tracker is a value implementing [`Site`] plus whichever of
//! [`SourceAdapter`] (it can list local releases from a saved page) and
//! [`DestinationAdapter`] (it can be asked what it already carries) it
//! supports. There is no shared state between sites.

mod blu;
mod hdb;
mod hdt;
mod ptp;

use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{Config, ExternalId, Lookup, TitleSearch};
use crate::pipeline::CandidateScan;

pub use blu::Blu;
pub use hdb::Hdb;
pub use hdt::Hdt;
pub use ptp::Ptp;

/// Names accepted by the lookup functions, in display order.
pub const NAMES: [&str; 4] = ["BLU", "HDB", "HDT", "PTP"];

/// Capabilities every site declares.
pub trait Site: Send + Sync {
    fn name(&self) -> &'static str;

    fn can_be_source(&self) -> bool;

    fn can_be_destination(&self) -> bool;

    /// Whether a page URL belongs to this site.
    fn matches_url(&self, url: &str) -> bool;
}

/// A site whose listing pages can be scanned for candidate groups.
pub trait SourceAdapter: Site {
    /// Lazily turn a listing page into pipeline items, in document order.
    fn scan<'a>(&self, document: &'a Html) -> CandidateScan<'a>;
}

/// A site that can be queried for the releases it already has.
///
/// Implementations never fail: transport or page-shape errors come back
/// as [`Lookup::Unresolved`].
#[async_trait]
pub trait DestinationAdapter: Site {
    async fn query_by_exact_id(&self, id: &ExternalId) -> Lookup;

    async fn query_by_title_year(&self, title: &str, year: u16) -> TitleSearch;
}

/// Look up a source adapter by name (case-insensitive).
pub fn source_by_name(
    name: &str,
    config: &Config,
    client: &Client,
) -> Result<Option<Box<dyn SourceAdapter>>> {
    let site: Box<dyn SourceAdapter> = match name.to_uppercase().as_str() {
        "BLU" => Box::new(Blu::new(client.clone(), &config.sites.blu_url)?),
        "HDB" => Box::new(Hdb::new(client.clone(), &config.sites.hdb_url)?),
        "HDT" => Box::new(Hdt::new()?),
        "PTP" => Box::new(Ptp::new(client.clone(), &config.sites.ptp_url)?),
        _ => return Ok(None),
    };
    Ok(Some(site))
}

/// Look up a destination adapter by name (case-insensitive).
pub fn destination_by_name(
    name: &str,
    config: &Config,
    client: &Client,
) -> Result<Option<Box<dyn DestinationAdapter>>> {
    let site: Box<dyn DestinationAdapter> = match name.to_uppercase().as_str() {
        "BLU" => Box::new(Blu::new(client.clone(), &config.sites.blu_url)?),
        "HDB" => Box::new(Hdb::new(client.clone(), &config.sites.hdb_url)?),
        "PTP" => Box::new(Ptp::new(client.clone(), &config.sites.ptp_url)?),
        _ => return Ok(None),
    };
    Ok(Some(site))
}

/// All known sites with their capabilities.
pub fn all_sites(config: &Config, client: &Client) -> Result<Vec<Box<dyn Site>>> {
    Ok(vec![
        Box::new(Blu::new(client.clone(), &config.sites.blu_url)?),
        Box::new(Hdb::new(client.clone(), &config.sites.hdb_url)?),
        Box::new(Hdt::new()?),
        Box::new(Ptp::new(client.clone(), &config.sites.ptp_url)?),
    ])
}

/// Find the source adapter that owns a page URL.
pub fn source_for_url(
    url: &str,
    config: &Config,
    client: &Client,
) -> Result<Option<Box<dyn SourceAdapter>>> {
    for name in NAMES {
        if let Some(site) = source_by_name(name, config, client)? {
            if site.matches_url(url) {
                return Ok(Some(site));
            }
        }
    }
    Ok(None)
}

/// Parse a CSS selector, mapping failures into [`AppError::Selector`].
pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Text content of an element with whitespace collapsed.
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first match of `selector` under `element`.
pub(crate) fn select_text(element: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(|e| element_text(&e))
        .filter(|t| !t.is_empty())
}

/// Strip a trailing slash so paths can be appended with `format!`.
pub(crate) fn base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client::new()
    }

    #[test]
    fn test_parse_selector_valid() {
        assert!(parse_selector("div.class").is_ok());
        assert!(parse_selector("tr:has(a)").is_ok());
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
    }

    #[test]
    fn test_element_text_collapses_whitespace() {
        let html = Html::parse_fragment("<p>  Heat \n  <b>1995</b>\t1080p </p>");
        let p = parse_selector("p").unwrap();
        let element = html.select(&p).next().unwrap();
        assert_eq!(element_text(&element), "Heat 1995 1080p");
    }

    #[test]
    fn test_lookup_by_name() {
        let config = Config::default();
        assert!(source_by_name("hdb", &config, &client()).unwrap().is_some());
        assert!(source_by_name("PTP", &config, &client()).unwrap().is_some());
        assert!(source_by_name("XYZ", &config, &client()).unwrap().is_none());
        assert!(destination_by_name("ptp", &config, &client()).unwrap().is_some());
        assert!(destination_by_name("HDT", &config, &client()).unwrap().is_none());
    }

    #[test]
    fn test_capabilities_match_registry() {
        let config = Config::default();
        let sites = all_sites(&config, &client()).unwrap();
        assert_eq!(sites.iter().map(|s| s.name()).collect::<Vec<_>>(), NAMES);
        for site in &sites {
            let as_source = source_by_name(site.name(), &config, &client()).unwrap();
            let as_destination = destination_by_name(site.name(), &config, &client()).unwrap();
            assert_eq!(site.can_be_source(), as_source.is_some(), "{}", site.name());
            assert_eq!(
                site.can_be_destination(),
                as_destination.is_some(),
                "{}",
                site.name()
            );
        }
    }

    #[test]
    fn test_source_for_url() {
        let config = Config::default();
        let site = source_for_url("https://hdbits.org/browse.php?c1=1", &config, &client())
            .unwrap()
            .unwrap();
        assert_eq!(site.name(), "HDB");
        let site = source_for_url("https://blutopia.xyz/torrents", &config, &client())
            .unwrap()
            .unwrap();
        assert_eq!(site.name(), "BLU");
        let site = source_for_url(
            "https://passthepopcorn.me/torrents.php?searchstr=heat",
            &config,
            &client(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(site.name(), "PTP");
        assert!(
            source_for_url("https://example.com/", &config, &client())
                .unwrap()
                .is_none()
        );
    }
}
