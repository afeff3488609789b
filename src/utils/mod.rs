//! Utility functions and helpers.

pub mod http;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Resolve a URL string against a base URL string.
pub fn resolve(base_url: &str, href: &str) -> Option<String> {
    Url::parse(base_url)
        .ok()
        .map(|base| resolve_url(&base, href))
}

/// Absolute URL of a stored file.
///
/// `path` is returned unchanged when it is already an absolute http(s) URL.
/// Otherwise `template` is expanded (`{category}`, `{path}`) and joined onto
/// `base_url`. Returns `None` for a blank path or an unparseable base.
pub fn file_url(base_url: &str, template: &str, category: &str, path: &str) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }
    if path.starts_with("http://") || path.starts_with("https://") {
        return Some(path.to_string());
    }

    let relative = template
        .replace("{category}", category.trim_matches('/'))
        .replace("{path}", path.trim_start_matches('/'));
    resolve(base_url, &relative)
}
