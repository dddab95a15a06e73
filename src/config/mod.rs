//! Configuration module for Siphon
//!
//! A crawl is configured from command-line values layered over an optional
//! TOML file. The result is an immutable [`CrawlConfig`] shared by every
//! component for the lifetime of the crawl.
//!
//! # Example
//!
//! ```no_run
//! use siphon::config::{load_config, ConfigOverrides};
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("siphon.toml")), ConfigOverrides::default()).unwrap();
//! println!("Crawler will use max depth: {}", config.maximum_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, CrawlSection, FileConfig, HttpConfig, HttpSection, DEFAULT_CONCURRENT_DOWNLOADS,
    DEFAULT_CONCURRENT_REQUESTS, DEFAULT_MAXIMUM_DEPTH, DEFAULT_MAXIMUM_URIS, DEFAULT_REFERRER,
    DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{build_config, load_config, load_file_config, ConfigOverrides};
pub use validation::validate;
