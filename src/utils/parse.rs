// src/utils/parse.rs

//! Normalization of scraped text into typed release fields.
//!
//! Every parser returns `None` (or an empty set) for text it does not
//! understand. Missing values are wildcards for the matching rules, so a
//! parser must never guess.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::{ExternalId, Resolution, Tag};

static SIZE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d,]*(?:\.\d+)?)\s*(GiB|GB|MiB|MB)").unwrap());
static DIMENSIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{3,4})x(\d{3,4})\b").unwrap());
static HDRIP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)hdrip").unwrap());
static IMDB_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"tt\d+").unwrap());
static DOTTED_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\.(\d{4})\.").unwrap());
static SPACED_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s+(\d{4})\s+(.*)$").unwrap());

/// Resolution aliases, checked class by class in this order.
const RESOLUTION_ALIASES: [(Resolution, &[&str]); 4] = [
    (Resolution::Sd, &["sd", "pal", "ntsc"]),
    (Resolution::Hd, &["720p", "hd"]),
    (Resolution::Fhd, &["1080p", "fhd", "full_hd"]),
    (Resolution::Uhd, &["2160p", "uhd", "4k"]),
];

const CODEC_ALIASES: [(&str, &[&str]); 2] = [
    ("x264", &["x264", "h264", "h.264", "h 264"]),
    ("x265", &["x265", "h265", "h.265", "h 265", "hevc"]),
];

/// Title and year pulled out of a combined string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleYear {
    pub title: String,
    pub year: u16,
    /// Text after the year (space-delimited shape only)
    pub rest: Option<String>,
}

/// Parse a size such as "8.02 GiB" or "700 MB" into megabytes.
pub fn parse_size(text: &str) -> Option<f64> {
    let caps = SIZE_RE.captures(text)?;
    let magnitude: f64 = caps[1].replace(',', "").parse().ok()?;
    let megabytes = match &caps[2] {
        "GB" | "GiB" => magnitude * 1024.0,
        _ => magnitude,
    };
    (megabytes > 0.0).then_some(megabytes)
}

/// Detect the resolution class of a release name or a raw resolution value.
///
/// Scan-line aliases ("1080p", "4k") are looked up first since they never
/// occur inside other tokens. Word aliases ("hd", "uhd") are matched as
/// whole hyphen-joined words, so an audio tag like "DTS-HD" is not HD.
/// Failing both, a `WIDTHxHEIGHT` pair is bucketed by height.
pub fn parse_resolution(text: &str) -> Option<Resolution> {
    let lowered = text
        .to_lowercase()
        .replace("full hd", "full_hd")
        .replace("full-hd", "full_hd");

    let scan_lines = tokens(&lowered, &['_']);
    if let Some(class) = find_alias(&scan_lines, is_scan_line) {
        return Some(class);
    }
    let words = tokens(&lowered, &['_', '-']);
    if let Some(class) = find_alias(&words, |alias| !is_scan_line(alias)) {
        return Some(class);
    }

    let caps = DIMENSIONS_RE.captures(text)?;
    let height: u32 = caps[2].parse().ok()?;
    Some(bucket_height(height))
}

fn is_scan_line(alias: &str) -> bool {
    alias.starts_with(|c: char| c.is_ascii_digit())
}

/// Split on everything except ASCII alphanumerics and `keep`.
fn tokens<'a>(text: &'a str, keep: &[char]) -> Vec<&'a str> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || keep.contains(&c)))
        .filter(|t| !t.is_empty())
        .collect()
}

/// First class, in priority order, with an alias accepted by `kind` among `tokens`.
fn find_alias(tokens: &[&str], kind: impl Fn(&str) -> bool) -> Option<Resolution> {
    RESOLUTION_ALIASES
        .iter()
        .find(|(_, aliases)| {
            aliases
                .iter()
                .any(|alias| kind(alias) && tokens.contains(alias))
        })
        .map(|(class, _)| class.clone())
}

fn bucket_height(height: u32) -> Resolution {
    match height {
        h if h < 720 => Resolution::Sd,
        h if h < 1080 => Resolution::Hd,
        h if h < 2160 => Resolution::Fhd,
        _ => Resolution::Uhd,
    }
}

/// Vertical pixel count from "720x576", "576p" or "1080i".
pub fn parse_height(raw: &str) -> Option<u32> {
    let raw = raw.trim().to_lowercase();
    let height = match raw.split_once('x') {
        Some((_, height)) => height,
        None => raw.trim_end_matches(['p', 'i']),
    };
    height.trim().parse().ok().filter(|h| *h > 0)
}

/// Detect the codec class of a release name.
pub fn parse_codec(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    CODEC_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| lowered.contains(alias)))
        .map(|(codec, _)| *codec)
}

/// Detect Remux/HDR/DV qualifiers in a release name.
pub fn parse_tags(text: &str) -> BTreeSet<Tag> {
    let mut tags = BTreeSet::new();
    if text.to_lowercase().contains("remux") {
        tags.insert(Tag::Remux);
    }
    // "HDRip" is a rip source, not high dynamic range.
    if HDRIP_RE.replace_all(text, "").contains("HDR") {
        tags.insert(Tag::Hdr);
    }
    if text.contains("DV") {
        tags.insert(Tag::Dv);
    }
    tags
}

/// Parse a dot-delimited release name like `The.Thing.1982.1080p.BluRay`.
pub fn parse_release_name(name: &str) -> Option<TitleYear> {
    let caps = DOTTED_NAME_RE.captures(name)?;
    let title = caps[1].replace('.', " ").trim().to_string();
    let year = caps[2].parse().ok()?;
    Some(TitleYear {
        title,
        year,
        rest: None,
    })
}

/// Parse a space-delimited title like `The Thing 1982 1080p BluRay`.
pub fn parse_title_year(text: &str) -> Option<TitleYear> {
    let caps = SPACED_NAME_RE.captures(text.trim())?;
    let year = caps[2].parse().ok()?;
    Some(TitleYear {
        title: caps[1].trim().to_string(),
        year,
        rest: Some(caps[3].trim().to_string()),
    })
}

/// First `tt…` id in a piece of text.
pub fn parse_imdb_id(text: &str) -> Option<ExternalId> {
    IMDB_RE
        .find(text)
        .map(|m| ExternalId::new(m.as_str()))
}

/// Id from an IMDb title link such as `https://www.imdb.com/title/tt0113277/?ref_=x`.
pub fn parse_imdb_id_from_href(href: &str) -> Option<ExternalId> {
    let (_, tail) = href.split_once("imdb.com/title/")?;
    let tail = tail.split(['?', '#']).next().unwrap_or_default();
    parse_imdb_id(tail.trim_matches('/'))
}
