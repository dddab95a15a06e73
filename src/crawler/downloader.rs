//! Download subsystem
//!
//! Turns a downloadable URI into a file under the output directory. Each
//! target path is transferred at most once per run, existing files are kept
//! unless overwriting is enabled, and transfers run inside the download pool.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::retry::RetryPolicy;
use crate::crawler::scheduler::Scheduler;
use crate::state::DownloadLedger;
use crate::url::{target_path, CrawlUri};
use crate::{Result, SiphonError};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs::{self, File};

/// A completed transfer
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRecord {
    /// Where the body was written
    pub path: PathBuf,

    /// Bytes written to disk
    pub bytes: u64,

    /// Wall-clock time of the successful attempt, including the request
    pub elapsed: Duration,
}

impl DownloadRecord {
    /// Average throughput of the transfer
    pub fn bytes_per_second(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            self.bytes as f64 / seconds
        } else {
            self.bytes as f64
        }
    }
}

/// What a download request ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadStatus {
    /// The body was fetched and written
    Transferred(DownloadRecord),

    /// The target path was already handed out earlier in this run
    AlreadyDispatched,

    /// The file is on disk and overwriting is disabled
    Exists(PathBuf),
}

/// Performs downloads for a crawl
pub struct Downloader {
    fetcher: Arc<dyn Fetcher>,
    scheduler: Scheduler,
    retry: RetryPolicy,
    ledger: DownloadLedger,
    output_directory: PathBuf,
    overwrite_existing_files: bool,
}

impl Downloader {
    pub fn new(config: &CrawlConfig, fetcher: Arc<dyn Fetcher>, scheduler: Scheduler) -> Self {
        Self {
            fetcher,
            scheduler,
            retry: RetryPolicy::from_config(&config.http),
            ledger: DownloadLedger::new(),
            output_directory: config.output_directory.clone(),
            overwrite_existing_files: config.overwrite_existing_files,
        }
    }

    /// Targets dispatched so far, successful or not
    #[cfg(test)]
    fn ledger(&self) -> &DownloadLedger {
        &self.ledger
    }

    /// Downloads `uri` to its target path
    ///
    /// The target is claimed before anything else happens, so a failed
    /// transfer is not attempted again by a later caller.
    pub async fn download(&self, uri: &CrawlUri) -> Result<DownloadStatus> {
        let target = target_path(&self.output_directory, uri);

        if !self.ledger.claim(&target) {
            tracing::debug!("{} already dispatched to {}", uri, target.display());
            return Ok(DownloadStatus::AlreadyDispatched);
        }

        if !self.overwrite_existing_files && fs::try_exists(&target).await? {
            tracing::debug!("Skipping {}: {} exists", uri, target.display());
            return Ok(DownloadStatus::Exists(target));
        }

        let Some(_permit) = self.scheduler.acquire_download().await else {
            return Err(SiphonError::Io(io::Error::new(
                io::ErrorKind::Other,
                "download pool closed",
            )));
        };

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let destination = target.as_path();
        let (bytes, elapsed) = self
            .retry
            .run(uri.as_str(), move || async move {
                let started = Instant::now();
                let bytes = self.transfer(uri, destination).await?;
                Ok::<_, SiphonError>((bytes, started.elapsed()))
            })
            .await?;

        Ok(DownloadStatus::Transferred(DownloadRecord {
            path: target,
            bytes,
            elapsed,
        }))
    }

    /// One attempt: request, check status, stream to disk
    ///
    /// The body goes to a sibling partial file that replaces the target only
    /// once it is complete, so a failed attempt never touches an existing copy.
    async fn transfer(&self, uri: &CrawlUri, target: &Path) -> Result<u64> {
        let response = self.fetcher.fetch(uri).await?;

        if !response.is_success() {
            return Err(SiphonError::UnexpectedStatus {
                url: uri.to_string(),
                status: response.status(),
            });
        }

        let partial = partial_path(target);
        let mut file = File::create(&partial).await?;
        let written = response.write_to(&mut file).await;
        drop(file);

        let result = match written {
            Ok(bytes) => fs::rename(&partial, target)
                .await
                .map(|()| bytes)
                .map_err(SiphonError::from),
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(e) = fs::remove_file(&partial).await {
                tracing::debug!("Could not remove partial {}: {}", partial.display(), e);
            }
        }

        result
    }
}

/// Hidden sibling of `target` that receives the body while it streams
fn partial_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.partial", name))
}
