//! Siphon main entry point
//!
//! This is the command-line interface for the Siphon site mirror.

use anyhow::Context;
use clap::Parser;
use siphon::config::{load_config, ConfigOverrides};
use siphon::crawler::crawl;
use siphon::output::print_summary;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Siphon: a bounded, depth-limited site mirror
///
/// Siphon walks a site starting from one URI, staying on its host (and
/// optionally its subdomains), and downloads every resource whose media type
/// or file extension was asked for.
#[derive(Parser, Debug)]
#[command(name = "siphon")]
#[command(version = "1.0.0")]
#[command(about = "A bounded, depth-limited site mirror", long_about = None)]
struct Cli {
    /// Root URI to start crawling from
    #[arg(short = 'u', long = "uri", value_name = "URI")]
    uri: Option<String>,

    /// Directory the downloaded files are written to
    #[arg(short = 'o', long = "output", value_name = "DIR")]
    output: Option<PathBuf>,

    /// Media type to download (repeatable)
    #[arg(short = 't', long = "mime-type", value_name = "TYPE")]
    mime_types: Vec<String>,

    /// File extension to download (repeatable)
    #[arg(short = 'e', long = "file-extension", value_name = "EXT")]
    file_extensions: Vec<String>,

    /// Maximum traversal depth [default: 1]
    #[arg(short = 'd', long = "depth")]
    depth: Option<usize>,

    /// Maximum number of URIs to visit [default: 1000000]
    #[arg(short = 'm', long = "max-uris")]
    max_uris: Option<usize>,

    /// Also visit subdomains of the root host
    #[arg(short = 's', long = "include-subdomains")]
    include_subdomains: bool,

    /// Number of concurrent page requests [default: 1]
    #[arg(short = 'R', long = "concurrent-requests")]
    concurrent_requests: Option<usize>,

    /// Number of concurrent downloads [default: 1]
    #[arg(short = 'D', long = "concurrent-downloads")]
    concurrent_downloads: Option<usize>,

    /// Replace files that already exist in the output directory
    #[arg(long)]
    overwrite: bool,

    /// Referer header sent with every request
    #[arg(long, value_name = "URI")]
    referrer: Option<String>,

    /// User-Agent header sent with every request
    #[arg(long, value_name = "AGENT")]
    user_agent: Option<String>,

    /// Request timeout in seconds [default: 30]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Attempts per request before giving up on transient errors [default: 3]
    #[arg(long, value_name = "N")]
    retry_attempts: Option<u32>,

    /// Delay between attempts in milliseconds [default: 5000]
    #[arg(long, value_name = "MS")]
    retry_delay: Option<u64>,

    /// Path to TOML configuration file
    #[arg(short = 'c', long = "config", value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            uri: self.uri.clone(),
            output: self.output.clone(),
            mime_types: self.mime_types.clone(),
            file_extensions: self.file_extensions.clone(),
            depth: self.depth,
            maximum_uris: self.max_uris,
            include_subdomains: self.include_subdomains,
            concurrent_requests: self.concurrent_requests,
            concurrent_downloads: self.concurrent_downloads,
            overwrite: self.overwrite,
            referrer: self.referrer.clone(),
            user_agent: self.user_agent.clone(),
            timeout_secs: self.timeout,
            retry_attempts: self.retry_attempts,
            retry_delay_ms: self.retry_delay,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Unexpected error encountered: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }

    let config = load_config(cli.config.as_deref(), cli.overrides())
        .context("Failed to load configuration")?;

    tracing::debug!(
        "Downloading media types {:?} and extensions {:?}",
        config.mime_types,
        config.file_extensions
    );

    let summary = crawl(config).await.context("Crawl failed")?;

    if !cli.quiet {
        print_summary(&summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("siphon=info,warn"),
            1 => EnvFilter::new("siphon=debug,info"),
            2 => EnvFilter::new("siphon=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
