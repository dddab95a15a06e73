//! Classification of a fetched URI into a [`VisitOutcome`]
//!
//! The decision depends only on the URI, its response and the configuration,
//! never on the branch that reached it, so outcomes can be shared globally.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{FetchResponse, Fetcher};
use crate::crawler::parser::extract_links;
use crate::crawler::retry::RetryPolicy;
use crate::state::VisitOutcome;
use crate::url::{file_extension, is_visitable, normalize, CrawlUri};
use crate::{FetchError, Result};
use std::collections::HashSet;

/// Media types whose documents are parsed for children
const HTML_MEDIA_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Returns true if the URI's file extension is one the crawl downloads
pub fn extension_matches(uri: &CrawlUri, config: &CrawlConfig) -> bool {
    file_extension(uri).is_some_and(|extension| config.file_extensions.contains(&extension))
}

pub fn is_html(media_type: &str) -> bool {
    HTML_MEDIA_TYPES.contains(&media_type)
}

/// Resolves the outcome for `uri`
///
/// URIs whose extension is configured are downloads without any request.
/// Everything else is fetched and classified, retrying the fetch and body
/// read together on transient errors.
pub async fn resolve(
    uri: &CrawlUri,
    fetcher: &dyn Fetcher,
    retry: &RetryPolicy,
    config: &CrawlConfig,
) -> Result<VisitOutcome> {
    if extension_matches(uri, config) {
        tracing::debug!("{} matches a configured extension", uri);
        return Ok(VisitOutcome::Download);
    }

    let outcome = retry
        .run(uri.as_str(), move || async move {
            let response = fetcher.fetch(uri).await?;
            classify(uri, response, config).await
        })
        .await?;

    Ok(outcome)
}

/// Decides what to do with a fetched response
pub async fn classify(
    uri: &CrawlUri,
    response: FetchResponse,
    config: &CrawlConfig,
) -> std::result::Result<VisitOutcome, FetchError> {
    if extension_matches(uri, config) {
        return Ok(VisitOutcome::Download);
    }

    if !response.is_success() {
        tracing::debug!("{} answered with status {}", uri, response.status());
        return Ok(VisitOutcome::Ignore);
    }

    let Some(media_type) = response.media_type().map(str::to_owned) else {
        return Ok(VisitOutcome::Ignore);
    };

    if is_html(&media_type) {
        let base_url = response.url().clone();
        let body = response.text().await?;
        let links = extract_links(&body, &base_url);
        return Ok(VisitOutcome::Expand(child_uris(uri, links, config)));
    }

    if config.mime_types.contains(&media_type) {
        Ok(VisitOutcome::Download)
    } else {
        Ok(VisitOutcome::Ignore)
    }
}

/// Normalizes, deduplicates and filters the raw links of `parent`
///
/// Links that fail to normalize are dropped. The parent itself and
/// anything off the visitable hosts are removed. Document order is kept.
pub fn child_uris(parent: &CrawlUri, links: Vec<String>, config: &CrawlConfig) -> Vec<CrawlUri> {
    let mut seen = HashSet::new();
    let mut children = Vec::new();

    for link in links {
        let child = match normalize(&link) {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!("Dropping link {} on {}: {}", link, parent, e);
                continue;
            }
        };

        if &child == parent || !is_visitable(&child, &config.root, config.include_subdomains) {
            continue;
        }

        if seen.insert(child.clone()) {
            children.push(child);
        }
    }

    children
}
