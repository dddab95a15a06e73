use crate::UrlError;
use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, CONTROLS};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Prefix stripped from every host so `www.example.com` and `example.com` collapse
const WWW_PREFIX: &str = "www.";

/// Characters escaped inside a single path segment after decoding
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Canonical absolute URI used as the identity key of the crawl
///
/// Two values are equal iff their canonical string forms are equal, which is
/// exactly how [`Url`] compares and hashes itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CrawlUri {
    url: Url,
}

impl CrawlUri {
    /// Canonical string form
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Underlying parsed URL
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// Normalized host, always non-empty and without the `www.` prefix
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Percent-encoded path, always starting with `/`
    pub fn path(&self) -> &str {
        self.url.path()
    }
}

impl fmt::Display for CrawlUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl FromStr for CrawlUri {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        normalize(s)
    }
}

/// Normalizes a raw string into a [`CrawlUri`]
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject schemes other than `http` and `https`
/// 3. Reject empty hosts, lowercase the host and strip every leading `www.`
/// 4. Remove dot segments (done by the parser) and canonicalize the
///    percent-encoding of every path segment
/// 5. Remove the fragment and an empty query string
///
/// Applying `normalize` to the canonical string of its own output yields an
/// equal value.
///
/// # Examples
///
/// ```
/// use siphon::url::normalize;
///
/// let uri = normalize("http://WWW.Example.com/a/../b%7e.txt#top").unwrap();
/// assert_eq!(uri.as_str(), "http://example.com/b~.txt");
/// ```
pub fn normalize(raw: &str) -> Result<CrawlUri, UrlError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    let host = match url.host_str() {
        Some(h) if !h.is_empty() => h.to_lowercase(),
        _ => return Err(UrlError::MissingHost),
    };

    let mut host = host.as_str();
    while let Some(rest) = host.strip_prefix(WWW_PREFIX) {
        host = rest;
    }
    if host.is_empty() {
        return Err(UrlError::MissingHost);
    }

    url.set_host(Some(host))
        .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;

    let path = canonical_path(url.path());
    url.set_path(&path);

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    Ok(CrawlUri { url })
}

/// Decodes then re-encodes each path segment so equivalent spellings agree
fn canonical_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let decoded: Vec<u8> = percent_decode_str(segment).collect();
            percent_encode(&decoded, PATH_SEGMENT).to_string()
        })
        .collect::<Vec<_>>()
        .join("/")
}
