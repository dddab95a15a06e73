//! Crawler module for traversal, classification and downloads
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - Fixed-delay retry of transient failures
//! - HTML link and image extraction
//! - Classification of URIs into visit outcomes
//! - The request and download worker pools
//! - Downloads to the output directory
//! - Overall crawl coordination

mod classifier;
mod coordinator;
mod downloader;
mod fetcher;
mod parser;
mod retry;
mod scheduler;

pub use classifier::{child_uris, classify, extension_matches, is_html, resolve};
pub use coordinator::Coordinator;
pub use downloader::{DownloadRecord, DownloadStatus, Downloader};
pub use fetcher::{
    build_http_client, client_builder, parse_media_type, FetchResponse, Fetcher, HttpFetcher,
};
pub use parser::extract_links;
pub use retry::{RetryPolicy, Retryable};
pub use scheduler::{Pool, Scheduler};

use crate::config::CrawlConfig;
use crate::output::CrawlSummary;
use crate::Result;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client from the configuration
/// 2. Visit the root URI and every reachable URI within the limits
/// 3. Download the matching resources
/// 4. Return the crawl summary
///
/// # Arguments
///
/// * `config` - The validated crawl configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl completed; individual URIs may still have failed
/// * `Err(SiphonError)` - The client or the output directory could not be set up
pub async fn crawl(config: CrawlConfig) -> Result<CrawlSummary> {
    Coordinator::from_config(config)?.run().await
}
