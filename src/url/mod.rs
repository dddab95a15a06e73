//! URL handling module for Siphon
//!
//! This module provides the canonical [`CrawlUri`] identity, host matching for
//! the visitable-host rule, and the mapping from a URI to its on-disk target.

mod domain;
mod matcher;
mod normalize;

// Re-export main functions
pub use domain::{file_extension, target_path};
pub use matcher::is_visitable_host;
pub use normalize::{normalize, CrawlUri};

/// Returns true if `uri` lies on a host the crawl rooted at `root` may visit
pub fn is_visitable(uri: &CrawlUri, root: &CrawlUri, include_subdomains: bool) -> bool {
    is_visitable_host(uri.host(), root.host(), include_subdomains)
}
