//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Category;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Reconciliation policy knobs
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Base URLs of the supported sites
    #[serde(default)]
    pub sites: SitesConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if !(self.matching.size_ratio > 1.0) {
            return Err(AppError::validation("matching.size_ratio must be > 1.0"));
        }
        for (name, base) in self.sites.entries() {
            url::Url::parse(base)
                .map_err(|e| AppError::validation(format!("sites.{name} is not a URL: {e}")))?;
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between destination queries in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Reconciliation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Size ratio at or above which two similar releases are distinct encodes
    #[serde(default = "defaults::size_ratio")]
    pub size_ratio: f64,

    /// Categories that are reconciled at all; a group without a category passes
    #[serde(default = "defaults::allowed_categories")]
    pub allowed_categories: Vec<Category>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            size_ratio: defaults::size_ratio(),
            allowed_categories: defaults::allowed_categories(),
        }
    }
}

/// Site base URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitesConfig {
    #[serde(default = "defaults::ptp_url")]
    pub ptp_url: String,
    #[serde(default = "defaults::hdb_url")]
    pub hdb_url: String,
    #[serde(default = "defaults::blu_url")]
    pub blu_url: String,
}

impl SitesConfig {
    fn entries(&self) -> [(&'static str, &str); 3] {
        [
            ("ptp_url", &self.ptp_url),
            ("hdb_url", &self.hdb_url),
            ("blu_url", &self.blu_url),
        ]
    }
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            ptp_url: defaults::ptp_url(),
            hdb_url: defaults::hdb_url(),
            blu_url: defaults::blu_url(),
        }
    }
}

mod defaults {
    use super::Category;

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; unique-finder/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        250
    }

    // Matching defaults
    pub fn size_ratio() -> f64 {
        1.5
    }
    pub fn allowed_categories() -> Vec<Category> {
        vec![
            Category::Movie,
            Category::Documentary,
            Category::LivePerformance,
        ]
    }

    // Site defaults
    pub fn ptp_url() -> String {
        "https://passthepopcorn.me".into()
    }
    pub fn hdb_url() -> String {
        "https://hdbits.org".into()
    }
    pub fn blu_url() -> String {
        "https://blutopia.cc".into()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_ratio_at_one() {
        let mut config = Config::default();
        config.matching.size_ratio = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_site_url() {
        let mut config = Config::default();
        config.sites.ptp_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[matching]\nsize_ratio = 2.0\nallowed_categories = [\"Movie\"]\n\n[http]\ntimeout_secs = 5"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.matching.size_ratio, 2.0);
        assert_eq!(config.matching.allowed_categories, vec![Category::Movie]);
        assert_eq!(config.http.timeout_secs, 5);
        assert_eq!(config.http.request_delay_ms, 250);
        assert_eq!(config.sites.ptp_url, "https://passthepopcorn.me");
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let config = Config::load_or_default("/nonexistent/config.toml");
        assert_eq!(config.matching.size_ratio, 1.5);
    }
}
