//! State module for tracking crawl progress
//!
//! This module holds the only data shared between concurrent branches of a
//! crawl.
//!
//! # Components
//!
//! - `VisitOutcome`: The memoized decision for a URI (download, expand, ignore)
//! - `OutcomeCache`: Compute-once map from URI to its outcome
//! - `DownloadLedger`: Set of download targets already dispatched

mod cache;
mod outcome;

// Re-export main types
pub use cache::{DownloadLedger, OutcomeCache};
pub use outcome::VisitOutcome;
