//! Output module for crawl statistics and reports
//!
//! This module handles:
//! - Counting what the crawl did while it runs
//! - Summarizing and printing the result
//! - Human-readable byte sizes for log lines

pub mod stats;

pub use stats::{human_size, print_summary, CrawlStatistics, CrawlSummary};
