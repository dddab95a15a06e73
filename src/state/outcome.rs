//! Visit outcome definitions
//!
//! An outcome is the memoized decision for one crawl URI.
use crate::url::CrawlUri;
use std::fmt;

/// What the crawl does with a URI once it has been resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitOutcome {
    /// The resource is handed to the download subsystem
    Download,

    /// HTML document; children are already filtered to visitable hosts,
    /// deduplicated and exclude the document itself
    Expand(Vec<CrawlUri>),

    /// Unsupported content, error status or a failed resolution
    Ignore,
}

impl VisitOutcome {
    /// Children to fan out to; empty for anything but `Expand`
    pub fn children(&self) -> &[CrawlUri] {
        match self {
            Self::Expand(children) => children,
            Self::Download | Self::Ignore => &[],
        }
    }

    /// Returns true if traversal stops at this URI
    ///
    /// An `Expand` without children behaves like `Ignore`.
    pub fn is_terminal(&self) -> bool {
        self.children().is_empty()
    }

    pub fn is_download(&self) -> bool {
        matches!(self, Self::Download)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Expand(_) => "expand",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for VisitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expand(children) => write!(f, "expand ({} children)", children.len()),
            other => f.write_str(other.as_str()),
        }
    }
}
