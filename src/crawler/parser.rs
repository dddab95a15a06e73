//! HTML parser for extracting crawl candidates
//!
//! This module handles parsing HTML content to extract the URIs a page
//! points at: `<a href>` targets and `<img src>` sources, resolved against
//! the document's own URL.

use scraper::{Html, Selector};
use url::Url;

/// Attribute carrying the target URI for each element we follow
const LINK_SOURCES: &[(&str, &str)] = &[("a[href]", "href"), ("img[src]", "src")];

/// Parses HTML content and returns every candidate link as an absolute URL
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">`, including `download` and `rel="nofollow"` anchors
/// - `<img src="...">`
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs
/// - Fragment-only links
/// - Anything that does not resolve to http(s)
///
/// Links are returned in document order and may contain duplicates.
///
/// # Example
///
/// ```
/// use siphon::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/page">Link</a><img src="logo.png">"#;
/// let base_url = Url::parse("https://example.com/docs/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links, vec![
///     "https://example.com/page".to_string(),
///     "https://example.com/docs/logo.png".to_string(),
/// ]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    for (selector, attribute) in LINK_SOURCES {
        let Ok(selector) = Selector::parse(selector) else {
            continue;
        };

        for element in document.select(&selector) {
            if let Some(absolute_url) = element
                .value()
                .attr(attribute)
                .and_then(|target| resolve_link(target, base_url))
            {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link target to an absolute URL
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(absolute_url.to_string()),
        _ => None,
    }
}
