//! Selector-driven href extraction
//!
//! Resolves every `href` matched by a CSS selector against the page URL and
//! filters out anything that is not a crawlable http(s) link.

use crate::fetch::{FetchError, FetchResult};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Parses a CSS selector, mapping failures into [`FetchError::Selector`]
pub fn parse_selector(selector: &str) -> FetchResult<Selector> {
    Selector::parse(selector).map_err(|e| FetchError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Extracts absolute links matched by `selector` from an HTML document
///
/// Links keep document order; repeated links are reported once, at their first
/// position.
///
/// # Example
///
/// ```
/// use evenflow::fetch::extract_hrefs;
/// use url::Url;
///
/// let html = r#"<ul><li><a href="/a">A</a></li><li><a href="/b">B</a></li></ul>"#;
/// let base = Url::parse("https://example.com/feed").unwrap();
/// let links = extract_hrefs(html, &base, "li a").unwrap();
/// assert_eq!(links, vec!["https://example.com/a", "https://example.com/b"]);
/// ```
pub fn extract_hrefs(html: &str, base_url: &Url, selector: &str) -> FetchResult<Vec<String>> {
    let selector = parse_selector(selector)?;
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if let Some(absolute) = resolve_link(href, base_url) {
            if seen.insert(absolute.clone()) {
                links.push(absolute);
            }
        }
    }

    Ok(links)
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    if absolute.scheme() == "http" || absolute.scheme() == "https" {
        Some(absolute.to_string())
    } else {
        None
    }
}
