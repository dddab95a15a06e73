//! Scheduler for the crawl's two worker pools
//!
//! This module handles:
//! - The request pool, bounding concurrent fetch + classify operations
//! - The download pool, bounding concurrent file transfers
//!
//! Both pools are plain semaphores; a saturated pool makes new work wait
//! rather than spawning more concurrency.

use crate::config::CrawlConfig;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Which of the two pools a permit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Requests,
    Downloads,
}

/// Scheduler owns the request and download semaphores
///
/// Permits are owned so they can be held across awaits inside spawned tasks.
/// Dropping a permit returns the slot to its pool.
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Slots for concurrent page and metadata fetches
    requests: Arc<Semaphore>,

    /// Slots for concurrent file transfers
    downloads: Arc<Semaphore>,

    request_limit: usize,
    download_limit: usize,
}

impl Scheduler {
    /// Creates a scheduler with the given pool sizes
    ///
    /// A limit of zero is raised to one so the crawl can always make progress.
    pub fn new(request_limit: usize, download_limit: usize) -> Self {
        let request_limit = request_limit.max(1);
        let download_limit = download_limit.max(1);

        Self {
            requests: Arc::new(Semaphore::new(request_limit)),
            downloads: Arc::new(Semaphore::new(download_limit)),
            request_limit,
            download_limit,
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(config.concurrent_requests, config.concurrent_downloads)
    }

    /// Waits for a free slot in the request pool
    ///
    /// Returns None only if the pool has been closed.
    pub async fn acquire_request(&self) -> Option<OwnedSemaphorePermit> {
        self.acquire(Pool::Requests).await
    }

    /// Waits for a free slot in the download pool
    pub async fn acquire_download(&self) -> Option<OwnedSemaphorePermit> {
        self.acquire(Pool::Downloads).await
    }

    async fn acquire(&self, pool: Pool) -> Option<OwnedSemaphorePermit> {
        let semaphore = match pool {
            Pool::Requests => &self.requests,
            Pool::Downloads => &self.downloads,
        };

        let permit = Arc::clone(semaphore).acquire_owned().await.ok();
        if permit.is_none() {
            tracing::debug!("{:?} pool closed while waiting for a permit", pool);
        }
        permit
    }

    /// Closes both pools; pending and future acquisitions return None
    pub fn close(&self) {
        self.requests.close();
        self.downloads.close();
    }

    /// Number of free slots in `pool`
    pub fn available(&self, pool: Pool) -> usize {
        match pool {
            Pool::Requests => self.requests.available_permits(),
            Pool::Downloads => self.downloads.available_permits(),
        }
    }

    /// Configured size of `pool`
    pub fn limit(&self, pool: Pool) -> usize {
        match pool {
            Pool::Requests => self.request_limit,
            Pool::Downloads => self.download_limit,
        }
    }
}
