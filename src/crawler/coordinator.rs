//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the recursive traversal that coordinates all aspects
//! of the crawling process, including:
//! - The admission ceiling on visited URIs
//! - Memoized, once-per-URI classification
//! - Depth-bounded fan-out over child links with a structured join
//! - Dispatching downloads
//! - Containing per-URI failures

use crate::config::CrawlConfig;
use crate::crawler::classifier;
use crate::crawler::downloader::{DownloadStatus, Downloader};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::retry::RetryPolicy;
use crate::crawler::scheduler::Scheduler;
use crate::output::{human_size, CrawlStatistics, CrawlSummary};
use crate::state::{OutcomeCache, VisitOutcome};
use crate::url::CrawlUri;
use crate::Result;
use futures::future::{BoxFuture, FutureExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;

/// Main crawler coordinator structure
///
/// A coordinator drives exactly one crawl; [`Coordinator::run`] consumes it.
pub struct Coordinator {
    inner: Arc<Inner>,
}

/// State shared by every branch of the traversal
struct Inner {
    config: Arc<CrawlConfig>,
    fetcher: Arc<dyn Fetcher>,
    scheduler: Scheduler,
    retry: RetryPolicy,
    outcomes: OutcomeCache,
    downloader: Downloader,
    statistics: CrawlStatistics,

    /// Visit calls seen so far, admitted or not
    admissions: AtomicUsize,
}

impl Coordinator {
    /// Creates a coordinator that fetches through `fetcher`
    pub fn new(config: CrawlConfig, fetcher: Arc<dyn Fetcher>) -> Self {
        let config = Arc::new(config);
        let scheduler = Scheduler::from_config(&config);
        let downloader = Downloader::new(&config, Arc::clone(&fetcher), scheduler.clone());

        Self {
            inner: Arc::new(Inner {
                retry: RetryPolicy::from_config(&config.http),
                config,
                fetcher,
                scheduler,
                outcomes: OutcomeCache::new(),
                downloader,
                statistics: CrawlStatistics::new(),
                admissions: AtomicUsize::new(0),
            }),
        }
    }

    /// Creates a coordinator backed by an HTTP client built from the config
    pub fn from_config(config: CrawlConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.http)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Runs the crawl to completion
    ///
    /// Per-URI failures are logged and absorbed. Only failing to create the
    /// output directory is returned as an error.
    pub async fn run(self) -> Result<CrawlSummary> {
        let inner = self.inner;
        let config = Arc::clone(&inner.config);

        tracing::info!(
            "Starting crawl of {} into {} (depth {}, {} request / {} download workers)",
            config.root,
            config.output_directory.display(),
            config.maximum_depth,
            config.concurrent_requests,
            config.concurrent_downloads
        );

        tokio::fs::create_dir_all(&config.output_directory).await?;

        let start_time = Instant::now();
        Arc::clone(&inner)
            .visit(config.root.clone(), Arc::new(Vec::new()))
            .await;
        inner.scheduler.close();

        let summary = inner.statistics.summary(start_time.elapsed());
        tracing::info!("Crawl completed: {}", summary);

        Ok(summary)
    }
}

impl Inner {
    /// Visits `uri` reached through `ancestors`
    ///
    /// Boxed because visits recurse through spawned child tasks.
    fn visit(self: Arc<Self>, uri: CrawlUri, ancestors: Arc<Vec<CrawlUri>>) -> BoxFuture<'static, ()> {
        async move {
            if !self.admit(&uri) {
                return;
            }

            let outcome = self.resolve(&uri).await;
            match outcome {
                VisitOutcome::Download => self.download(&uri).await,
                VisitOutcome::Expand(children) if !children.is_empty() => {
                    self.expand(uri, children, ancestors).await
                }
                VisitOutcome::Expand(_) | VisitOutcome::Ignore => {}
            }
        }
        .boxed()
    }

    /// Counts the visit against the ceiling; false once the ceiling is passed
    fn admit(&self, uri: &CrawlUri) -> bool {
        let admitted = self.admissions.fetch_add(1, Ordering::SeqCst) + 1;

        if admitted > self.config.maximum_uris {
            tracing::debug!(
                "Skipping {}: limit of {} URIs reached",
                uri,
                self.config.maximum_uris
            );
            self.statistics.record_rejected();
            return false;
        }

        self.statistics.record_admitted();
        true
    }

    /// Returns the memoized outcome for `uri`, computing it on first sight
    ///
    /// Failures are logged and remembered as `Ignore`.
    async fn resolve(&self, uri: &CrawlUri) -> VisitOutcome {
        if let Some(outcome) = self.outcomes.get(uri) {
            tracing::debug!("Reusing outcome for {}: {}", uri, outcome);
            return outcome;
        }

        let inner = self;
        self.outcomes
            .get_or_resolve(uri, move || async move {
                let _permit = inner.scheduler.acquire_request().await;

                let outcome = match classifier::resolve(
                    uri,
                    inner.fetcher.as_ref(),
                    &inner.retry,
                    &inner.config,
                )
                .await
                {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        tracing::warn!("Failed to resolve {}: {}", uri, e.root_cause());
                        inner.statistics.record_classification_failure();
                        return VisitOutcome::Ignore;
                    }
                };

                if outcome.is_terminal() && !outcome.is_download() {
                    inner.statistics.record_ignored();
                }
                tracing::debug!("Resolved {}: {}", uri, outcome);
                outcome
            })
            .await
    }

    async fn download(&self, uri: &CrawlUri) {
        match self.downloader.download(uri).await {
            Ok(DownloadStatus::Transferred(record)) => {
                tracing::info!(
                    "Downloaded {} -> {} [{}] ({}/s)",
                    uri,
                    record.path.display(),
                    human_size(record.bytes),
                    human_size(record.bytes_per_second() as u64)
                );
                self.statistics.record_download(record.bytes);
            }
            Ok(DownloadStatus::Exists(_)) => self.statistics.record_download_skipped(),
            Ok(DownloadStatus::AlreadyDispatched) => {}
            Err(e) => {
                tracing::warn!("Failed to download {}: {}", uri, e.root_cause());
                self.statistics.record_download_failure();
            }
        }
    }

    /// Fans out to `children` and waits for every child branch to finish
    async fn expand(
        self: Arc<Self>,
        uri: CrawlUri,
        children: Vec<CrawlUri>,
        ancestors: Arc<Vec<CrawlUri>>,
    ) {
        if ancestors.len() >= self.config.maximum_depth {
            tracing::debug!("Not expanding {}: depth {} reached", uri, ancestors.len());
            return;
        }

        tracing::info!("Visiting {} (depth {})", uri, ancestors.len());
        self.statistics.record_expanded();

        let mut path = Vec::with_capacity(ancestors.len() + 1);
        path.extend(ancestors.iter().cloned());
        path.push(uri.clone());
        let path = Arc::new(path);

        let mut tasks = JoinSet::new();
        for child in children {
            if path.contains(&child) {
                continue;
            }
            tasks.spawn(Arc::clone(&self).visit(child, Arc::clone(&path)));
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("A child visit of {} did not complete: {}", uri, e);
            }
        }
    }
}
