//! Crawl statistics
//!
//! Counters are updated concurrently from every branch of the crawl and
//! snapshotted into a [`CrawlSummary`] once the crawl has finished.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters shared by all crawl tasks
#[derive(Debug, Default)]
pub struct CrawlStatistics {
    /// URIs that passed the admission ceiling
    admitted: AtomicU64,

    /// URIs turned away by the admission ceiling
    rejected: AtomicU64,

    /// Pages that fanned out to children
    expanded: AtomicU64,

    /// URIs resolved to nothing worth doing
    ignored: AtomicU64,

    /// Resolutions that failed and were recorded as ignored
    classification_failures: AtomicU64,

    downloads_completed: AtomicU64,
    downloads_skipped: AtomicU64,
    download_failures: AtomicU64,
    bytes_downloaded: AtomicU64,
}

impl CrawlStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_admitted(&self) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expanded(&self) {
        self.expanded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_classification_failure(&self) {
        self.classification_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_download(&self, bytes: u64) {
        self.downloads_completed.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_download_skipped(&self) {
        self.downloads_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_download_failure(&self) {
        self.download_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters into a summary
    pub fn summary(&self, elapsed: Duration) -> CrawlSummary {
        CrawlSummary {
            admitted: self.admitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            expanded: self.expanded.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            classification_failures: self.classification_failures.load(Ordering::Relaxed),
            downloads_completed: self.downloads_completed.load(Ordering::Relaxed),
            downloads_skipped: self.downloads_skipped.load(Ordering::Relaxed),
            download_failures: self.download_failures.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

/// Snapshot of a finished crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub admitted: u64,
    pub rejected: u64,
    pub expanded: u64,
    pub ignored: u64,
    pub classification_failures: u64,
    pub downloads_completed: u64,
    pub downloads_skipped: u64,
    pub download_failures: u64,
    pub bytes_downloaded: u64,
    pub elapsed: Duration,
}

impl CrawlSummary {
    /// Average download throughput over the whole crawl
    pub fn bytes_per_second(&self) -> f64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            self.bytes_downloaded as f64 / seconds
        } else {
            0.0
        }
    }
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} URIs visited, {} files downloaded ({}), {} skipped, {} failed in {:.1}s",
            self.admitted,
            self.downloads_completed,
            human_size(self.bytes_downloaded),
            self.downloads_skipped,
            self.download_failures + self.classification_failures,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Traversal:");
    println!("  URIs visited: {}", summary.admitted);
    println!("  URIs over the limit: {}", summary.rejected);
    println!("  Pages expanded: {}", summary.expanded);
    println!("  URIs ignored: {}", summary.ignored);
    println!("  Failed resolutions: {}", summary.classification_failures);
    println!();

    println!("Downloads:");
    println!("  Completed: {}", summary.downloads_completed);
    println!("  Skipped (already on disk): {}", summary.downloads_skipped);
    println!("  Failed: {}", summary.download_failures);
    println!("  Transferred: {}", human_size(summary.bytes_downloaded));
    println!();

    println!(
        "Elapsed: {:.1}s ({}/s)",
        summary.elapsed.as_secs_f64(),
        human_size(summary.bytes_per_second() as u64)
    );
}

/// Renders a byte count with a binary unit, e.g. `1.5 KB`
///
/// # Examples
///
/// ```
/// use siphon::output::human_size;
///
/// assert_eq!(human_size(512), "512 B");
/// assert_eq!(human_size(1536), "1.5 KB");
/// ```
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", size, UNITS[unit])
}
