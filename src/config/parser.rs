use crate::config::types::{CrawlConfig, FileConfig};
use crate::config::validation::validate;
use crate::url::normalize;
use crate::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Values supplied on the command line; they take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub uri: Option<String>,
    pub output: Option<PathBuf>,
    pub mime_types: Vec<String>,
    pub file_extensions: Vec<String>,
    pub depth: Option<usize>,
    pub maximum_uris: Option<usize>,
    pub include_subdomains: bool,
    pub concurrent_requests: Option<usize>,
    pub concurrent_downloads: Option<usize>,
    pub overwrite: bool,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

/// Reads and parses a TOML configuration file
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(FileConfig)` - Successfully parsed file
/// * `Err(ConfigError)` - Failed to read or parse the file
pub fn load_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Loads the optional config file, layers the overrides on top and validates
///
/// # Example
///
/// ```no_run
/// use siphon::config::{load_config, ConfigOverrides};
/// use std::path::Path;
///
/// let overrides = ConfigOverrides {
///     uri: Some("https://example.com".to_string()),
///     output: Some("mirror".into()),
///     mime_types: vec!["application/pdf".to_string()],
///     ..Default::default()
/// };
/// let config = load_config(Some(Path::new("siphon.toml")), overrides).unwrap();
/// println!("Max depth: {}", config.maximum_depth);
/// ```
pub fn load_config(
    path: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<CrawlConfig, ConfigError> {
    let file = match path {
        Some(p) => load_file_config(p)?,
        None => FileConfig::default(),
    };

    build_config(file, overrides)
}

/// Merges file values and overrides into a validated [`CrawlConfig`]
pub fn build_config(
    file: FileConfig,
    overrides: ConfigOverrides,
) -> Result<CrawlConfig, ConfigError> {
    let FileConfig { crawl, http } = file;

    let raw_uri = overrides
        .uri
        .or(crawl.uri)
        .ok_or_else(|| ConfigError::Validation("a root URI is required".to_string()))?;
    let root = normalize(&raw_uri)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URI '{}': {}", raw_uri, e)))?;

    let output = overrides
        .output
        .or(crawl.output)
        .ok_or_else(|| ConfigError::Validation("an output directory is required".to_string()))?;

    let mut config = CrawlConfig::new(root, output);

    let mime_types = if overrides.mime_types.is_empty() {
        crawl.mime_types
    } else {
        overrides.mime_types
    };
    config.mime_types = mime_types
        .iter()
        .map(|m| m.trim().to_lowercase())
        .collect();

    let file_extensions = if overrides.file_extensions.is_empty() {
        crawl.file_extensions
    } else {
        overrides.file_extensions
    };
    config.file_extensions = file_extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_lowercase())
        .collect();

    if let Some(depth) = overrides.depth.or(crawl.depth) {
        config.maximum_depth = depth;
    }
    if let Some(maximum_uris) = overrides.maximum_uris.or(crawl.maximum_uris) {
        config.maximum_uris = maximum_uris;
    }
    if let Some(requests) = overrides.concurrent_requests.or(crawl.concurrent_requests) {
        config.concurrent_requests = requests;
    }
    if let Some(downloads) = overrides
        .concurrent_downloads
        .or(crawl.concurrent_downloads)
    {
        config.concurrent_downloads = downloads;
    }

    config.include_subdomains =
        overrides.include_subdomains || crawl.include_subdomains.unwrap_or(false);
    config.overwrite_existing_files = overrides.overwrite || crawl.overwrite.unwrap_or(false);

    if let Some(referrer) = overrides.referrer.or(http.referrer) {
        config.http.referrer = referrer;
    }
    if let Some(user_agent) = overrides.user_agent.or(http.user_agent) {
        config.http.user_agent = user_agent;
    }
    if let Some(secs) = overrides.timeout_secs.or(http.timeout_secs) {
        config.http.timeout = Duration::from_secs(secs);
    }
    if let Some(attempts) = overrides.retry_attempts.or(http.retry_attempts) {
        config.http.retry_attempts = attempts;
    }
    if let Some(delay) = overrides.retry_delay_ms.or(http.retry_delay_ms) {
        config.http.retry_delay = Duration::from_millis(delay);
    }

    validate(&config)?;

    Ok(config)
}
