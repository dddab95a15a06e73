use crate::state::VisitOutcome;
use crate::url::CrawlUri;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Concurrent map from URI to its memoized outcome
///
/// Each key owns a [`OnceCell`]: the first caller runs the resolution and
/// every concurrent caller for the same key waits for that single result.
/// The map lock is only held to look up or insert the cell, never across
/// an await.
#[derive(Debug, Default)]
pub struct OutcomeCache {
    entries: Mutex<HashMap<CrawlUri, Arc<OnceCell<VisitOutcome>>>>,
}

impl OutcomeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached outcome for `uri`, running `resolve` if no caller
    /// has done so yet
    pub async fn get_or_resolve<F, Fut>(&self, uri: &CrawlUri, resolve: F) -> VisitOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = VisitOutcome>,
    {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(entries.entry(uri.clone()).or_default())
        };

        cell.get_or_init(resolve).await.clone()
    }

    /// Outcome already computed for `uri`, if any
    pub fn get(&self, uri: &CrawlUri) -> Option<VisitOutcome> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(uri).and_then(|cell| cell.get().cloned())
    }

    /// Number of URIs ever looked up
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-wide set of download targets that have already been dispatched
///
/// Keyed on the target path so two URIs that map to the same file never
/// write it concurrently. Entries are never removed: a failed download stays
/// claimed.
#[derive(Debug, Default)]
pub struct DownloadLedger {
    claimed: Mutex<HashSet<PathBuf>>,
}

impl DownloadLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `target`; returns false if it was claimed before
    pub fn claim(&self, target: &Path) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target.to_path_buf())
    }

    #[cfg(test)]
    pub fn contains(&self, target: &Path) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(target)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
