//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured referrer and user agent
//! - GET requests with transparent redirect following
//! - Exposing status and media type for classification
//! - Streaming bodies to disk for downloads
//!
//! Non-2xx responses are returned like any other; the caller decides what
//! they mean.

use crate::config::HttpConfig;
use crate::url::CrawlUri;
use crate::{ConfigError, FetchError, SiphonError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, CONTENT_TYPE, REFERER};
use reqwest::{redirect::Policy, Client, ClientBuilder};
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use url::Url;

const ACCEPTED_ENCODINGS: &str = "gzip, deflate";
const MAX_REDIRECTS: usize = 10;
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Issues one network request per call
///
/// Retrying is the caller's job; implementations report failures as
/// [`FetchError`] so the caller can tell transient ones apart.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, uri: &CrawlUri) -> Result<FetchResponse, FetchError>;
}

/// Response of a single fetch
#[derive(Debug)]
pub struct FetchResponse {
    /// Final URL after redirects
    url: Url,

    /// HTTP status code
    status: u16,

    /// Media type without parameters, lowercase
    media_type: Option<String>,

    body: Body,
}

#[derive(Debug)]
enum Body {
    Remote(reqwest::Response),
    Buffered(Vec<u8>),
}

impl FetchResponse {
    /// Builds a response around an in-memory body
    pub fn from_bytes(
        url: Url,
        status: u16,
        content_type: Option<&str>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            url,
            status,
            media_type: content_type.and_then(parse_media_type),
            body: Body::Buffered(body.into()),
        }
    }

    fn from_response(response: reqwest::Response) -> Self {
        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_media_type);

        Self {
            url: response.url().clone(),
            status: response.status().as_u16(),
            media_type,
            body: Body::Remote(response),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    /// Reads the whole body as text, for HTML parsing
    pub async fn text(self) -> Result<String, FetchError> {
        match self.body {
            Body::Remote(response) => {
                let url = response.url().to_string();
                response
                    .text()
                    .await
                    .map_err(|source| FetchError::Http { url, source })
            }
            Body::Buffered(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }

    /// Streams the body into `writer` chunk by chunk and returns the byte count
    ///
    /// Read failures surface as [`SiphonError::Fetch`], write failures as
    /// [`SiphonError::Io`].
    pub async fn write_to<W>(self, writer: &mut W) -> Result<u64, SiphonError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let mut written = 0u64;

        match self.body {
            Body::Remote(mut response) => {
                let url = response.url().to_string();
                while let Some(chunk) = response.chunk().await.map_err(|source| {
                    FetchError::Http {
                        url: url.clone(),
                        source,
                    }
                })? {
                    writer.write_all(&chunk).await?;
                    written += chunk.len() as u64;
                }
            }
            Body::Buffered(bytes) => {
                writer.write_all(&bytes).await?;
                written = bytes.len() as u64;
            }
        }

        writer.flush().await?;
        Ok(written)
    }
}

/// Strips parameters from a `Content-Type` value and lowercases it
///
/// Returns None for an empty value.
pub fn parse_media_type(content_type: &str) -> Option<String> {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    if media_type.is_empty() {
        None
    } else {
        Some(media_type)
    }
}

/// Prepares a client builder with the crawl's headers, timeouts and redirect policy
///
/// Tests use the builder to add DNS overrides before building.
pub fn client_builder(config: &HttpConfig) -> Result<ClientBuilder, SiphonError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(ACCEPTED_ENCODINGS));
    headers.insert(
        REFERER,
        HeaderValue::from_str(&config.referrer).map_err(|_| {
            ConfigError::Validation(format!("invalid referrer '{}'", config.referrer))
        })?,
    );

    Ok(Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(config.timeout)
        .connect_timeout(config.timeout.min(MAX_CONNECT_TIMEOUT))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .deflate(true))
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use siphon::config::HttpConfig;
/// use siphon::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, SiphonError> {
    Ok(client_builder(config)?.build()?)
}

/// [`Fetcher`] backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, SiphonError> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Wraps an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, uri: &CrawlUri) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(uri.as_str())
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: uri.to_string(),
                source,
            })?;

        Ok(FetchResponse::from_response(response))
    }
}
