use crate::url::CrawlUri;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAXIMUM_DEPTH: usize = 1;
pub const DEFAULT_MAXIMUM_URIS: usize = 1_000_000;
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 1;
pub const DEFAULT_CONCURRENT_DOWNLOADS: usize = 1;
pub const DEFAULT_REFERRER: &str = "https://www.google.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5_000;

/// Immutable crawl configuration, built once at startup
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Where the crawl starts; also defines the visitable host
    pub root: CrawlUri,

    /// Root directory for downloaded files
    pub output_directory: PathBuf,

    /// Media types (lowercase, no parameters) that trigger a download
    pub mime_types: HashSet<String>,

    /// File extensions (lowercase, no leading dot) that trigger a download
    pub file_extensions: HashSet<String>,

    /// Maximum number of ancestors a page may have and still be expanded
    pub maximum_depth: usize,

    /// Hard ceiling on the number of URIs admitted for processing
    pub maximum_uris: usize,

    /// Whether subdomains of the root host are visitable
    pub include_subdomains: bool,

    /// Size of the page/metadata request pool
    pub concurrent_requests: usize,

    /// Size of the download pool
    pub concurrent_downloads: usize,

    /// Whether existing files are downloaded again
    pub overwrite_existing_files: bool,

    /// Outbound HTTP settings
    pub http: HttpConfig,
}

impl CrawlConfig {
    /// Creates a configuration with default limits and no download rules
    pub fn new(root: CrawlUri, output_directory: impl Into<PathBuf>) -> Self {
        Self {
            root,
            output_directory: output_directory.into(),
            mime_types: HashSet::new(),
            file_extensions: HashSet::new(),
            maximum_depth: DEFAULT_MAXIMUM_DEPTH,
            maximum_uris: DEFAULT_MAXIMUM_URIS,
            include_subdomains: false,
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
            concurrent_downloads: DEFAULT_CONCURRENT_DOWNLOADS,
            overwrite_existing_files: false,
            http: HttpConfig::default(),
        }
    }
}

/// Outbound HTTP configuration shared by classification and downloads
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Value of the `Referer` header
    pub referrer: String,

    /// Value of the `User-Agent` header
    pub user_agent: String,

    /// Timeout applied to every request
    pub timeout: Duration,

    /// Total attempts per fetch, including the first one
    pub retry_attempts: u32,

    /// Fixed pause between attempts
    pub retry_delay: Duration,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            referrer: DEFAULT_REFERRER.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// On-disk TOML configuration; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub crawl: CrawlSection,

    #[serde(default)]
    pub http: HttpSection,
}

/// `[crawl]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CrawlSection {
    pub uri: Option<String>,
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub mime_types: Vec<String>,
    #[serde(default)]
    pub file_extensions: Vec<String>,
    pub depth: Option<usize>,
    pub maximum_uris: Option<usize>,
    pub include_subdomains: Option<bool>,
    pub concurrent_requests: Option<usize>,
    pub concurrent_downloads: Option<usize>,
    pub overwrite: Option<bool>,
}

/// `[http]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct HttpSection {
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}
