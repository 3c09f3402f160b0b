//! Utility functions and helpers.

pub mod http;
pub mod parse;
pub mod report;

use url::Url;

/// Extract the host from a URL string, lower-cased.
pub fn get_domain(url_str: &str) -> Option<String> {
    Url::parse(url_str)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_lowercase()))
}

/// Whether `url` is served by `domain` or one of its subdomains.
pub fn is_on_domain(url: &str, domain: &str) -> bool {
    get_domain(url).is_some_and(|host| host == domain || host.ends_with(&format!(".{domain}")))
}
