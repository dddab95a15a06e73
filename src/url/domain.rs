use crate::url::CrawlUri;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};

/// File name used when a downloadable URI ends with `/`
const DIRECTORY_INDEX: &str = "index.html";

/// Returns the lowercase extension of the last path segment, if any
///
/// # Examples
///
/// ```
/// use siphon::url::{file_extension, normalize};
///
/// let uri = normalize("https://example.com/img/Logo.PNG").unwrap();
/// assert_eq!(file_extension(&uri), Some("png".to_string()));
///
/// let uri = normalize("https://example.com/img/").unwrap();
/// assert_eq!(file_extension(&uri), None);
/// ```
pub fn file_extension(uri: &CrawlUri) -> Option<String> {
    let name = uri.path().rsplit('/').next()?;
    let (stem, ext) = name.rsplit_once('.')?;

    if stem.is_empty() || ext.is_empty() {
        return None;
    }

    Some(decode_segment(ext).to_lowercase())
}

/// Computes where a downloaded resource lands on disk
///
/// The layout is `output_root/<host>/<directories of the path>/<file name>`.
/// Segments are percent-decoded; anything that would escape its directory
/// (`.`/`..` or embedded separators) is neutralized.
pub fn target_path(output_root: &Path, uri: &CrawlUri) -> PathBuf {
    let mut target = output_root.join(uri.host());

    let segments: Vec<&str> = uri.path().split('/').collect();
    let (file_name, directories) = match segments.split_last() {
        Some((last, dirs)) => (*last, dirs),
        None => ("", &[][..]),
    };

    for dir in directories {
        let dir = decode_segment(dir);
        if dir.is_empty() || dir == "." || dir == ".." {
            continue;
        }
        target.push(dir);
    }

    let file_name = decode_segment(file_name);
    if file_name.is_empty() || file_name == "." || file_name == ".." {
        target.push(DIRECTORY_INDEX);
    } else {
        target.push(file_name);
    }

    target
}

fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment)
        .decode_utf8_lossy()
        .replace(['/', '\\'], "_")
}
