//! Media release data structures.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::parse::{parse_codec, parse_resolution, parse_tags};

/// Resolution class of a release.
///
/// `Other` keeps a raw value a site printed verbatim (e.g. "576p",
/// "720x576") that could not be bucketed at scrape time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    Sd,
    Hd,
    Fhd,
    Uhd,
    Other(String),
}

impl Resolution {
    /// Bucket a raw value if possible, otherwise keep it raw.
    pub fn from_raw(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(parse_resolution(trimmed).unwrap_or_else(|| Self::Other(trimmed.to_string())))
    }

    /// Collapse an `Other` value into its class when the raw text allows it.
    pub fn normalized(&self) -> Self {
        match self {
            Self::Other(raw) => parse_resolution(raw).unwrap_or_else(|| self.clone()),
            class => class.clone(),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sd => f.write_str("SD"),
            Self::Hd => f.write_str("HD"),
            Self::Fhd => f.write_str("FHD"),
            Self::Uhd => f.write_str("UHD"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// Release qualifiers that gate matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tag {
    Remux,
    Hdr,
    Dv,
}

/// Content category as reported by the source site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Movie,
    Tv,
    Documentary,
    Music,
    Sport,
    Xxx,
    StandUp,
    LivePerformance,
}

/// Opaque handle back to the scraped row a release came from.
///
/// The engine only passes it to a [`ReleaseVisibility`] sink; what it
/// points at is the caller's business.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginRef(String);

impl OriginRef {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OriginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Receiver of the "hide this row" signal for redundant releases.
pub trait ReleaseVisibility {
    fn hide(&mut self, origin: &OriginRef);
}

impl ReleaseVisibility for std::collections::HashSet<OriginRef> {
    fn hide(&mut self, origin: &OriginRef) {
        self.insert(origin.clone());
    }
}

impl ReleaseVisibility for Vec<OriginRef> {
    fn hide(&mut self, origin: &OriginRef) {
        if !self.contains(origin) {
            self.push(origin.clone());
        }
    }
}

/// Discards hide signals.
impl ReleaseVisibility for () {
    fn hide(&mut self, _origin: &OriginRef) {}
}

/// One physical release instance, local or remote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaRelease {
    /// Size in megabytes, `None` when unknown
    pub size: Option<f64>,

    /// Resolution class, `None` matches anything
    pub resolution: Option<Resolution>,

    /// Codec/container identifier (e.g. "x264", "H.265", "BD66"), `None` matches anything
    pub codec: Option<String>,

    #[serde(default)]
    pub tags: BTreeSet<Tag>,

    pub category: Option<Category>,

    /// Back-reference to the scraped row
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<OriginRef>,
}

impl MediaRelease {
    /// Build a release from a scene-style name and a size in megabytes.
    ///
    /// Resolution, codec and tags are all derived from the name.
    pub fn from_name(name: &str, size: Option<f64>) -> Self {
        Self {
            size: size.filter(|s| *s > 0.0),
            resolution: parse_resolution(name),
            codec: parse_codec(name).map(str::to_string),
            tags: parse_tags(name),
            category: None,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: OriginRef) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn with_category(mut self, category: Option<Category>) -> Self {
        self.category = category;
        self
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// HDR10 or Dolby Vision.
    pub fn is_hdr(&self) -> bool {
        self.has_tag(Tag::Hdr) || self.has_tag(Tag::Dv)
    }
}
