//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use siphon::config::CrawlConfig;
use siphon::crawler::{client_builder, crawl, Coordinator, HttpFetcher};
use siphon::normalize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at `root` that downloads text/plain
fn create_test_config(root: &str, output: &TempDir) -> CrawlConfig {
    let mut config = CrawlConfig::new(normalize(root).unwrap(), output.path());
    config.mime_types.insert("text/plain".to_string());
    config.concurrent_requests = 4;
    config.concurrent_downloads = 2;
    config.http.timeout = Duration::from_secs(5);
    config.http.retry_attempts = 2;
    config.http.retry_delay = Duration::from_millis(10);
    config
}

/// Number of requests the server received for `request_path`
async fn requests_to(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == request_path)
        .count()
}

async fn mount_html(server: &MockServer, request_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(request_path))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn mount_text(server: &MockServer, request_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(request_path))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/plain"),
        )
        .mount(server)
        .await;
}

/// Where a file served by a local mock server lands
fn local_target(output: &TempDir, file: &str) -> PathBuf {
    output.path().join("127.0.0.1").join(file)
}

#[tokio::test]
async fn test_root_without_links() {
    let mock_server = MockServer::start().await;
    mount_html(&mock_server, "/", "<html><body>Nothing here</body></html>".to_string()).await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", mock_server.uri()), &output);

    let summary = crawl(config).await.expect("Crawl failed");

    assert_eq!(requests_to(&mock_server, "/").await, 1);
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
    assert_eq!(summary.downloads_completed, 0);
    assert!(!output.path().join("127.0.0.1").exists());
}

#[tokio::test]
async fn test_downloads_matching_media_type() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<html><body><a href="/test.txt">file</a></body></html>"#.to_string(),
    )
    .await;
    mount_text(&mock_server, "/test.txt", "test file contents").await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", mock_server.uri()), &output);

    let summary = crawl(config).await.expect("Crawl failed");

    assert_eq!(requests_to(&mock_server, "/").await, 1);
    assert!(requests_to(&mock_server, "/test.txt").await >= 1);
    assert_eq!(summary.downloads_completed, 1);
    assert_eq!(summary.bytes_downloaded, 18);
    assert_eq!(
        std::fs::read_to_string(local_target(&output, "test.txt")).unwrap(),
        "test file contents"
    );
}

#[tokio::test]
async fn test_depth_ceiling_stops_expansion() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<a href="/child.html">child</a>"#.to_string(),
    )
    .await;
    mount_html(
        &mock_server,
        "/child.html",
        r#"<a href="/deep.txt">deep</a>"#.to_string(),
    )
    .await;
    mount_text(&mock_server, "/deep.txt", "too deep").await;

    let output = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", mock_server.uri()), &output);
    config.maximum_depth = 1;

    crawl(config).await.expect("Crawl failed");

    assert_eq!(requests_to(&mock_server, "/").await, 1);
    assert_eq!(requests_to(&mock_server, "/child.html").await, 1);
    assert_eq!(requests_to(&mock_server, "/deep.txt").await, 0);
    assert!(!local_target(&output, "deep.txt").exists());
}

#[tokio::test]
async fn test_deeper_crawl_reaches_file() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<a href="/child.html">child</a>"#.to_string(),
    )
    .await;
    mount_html(
        &mock_server,
        "/child.html",
        r#"<a href="/deep.txt">deep</a>"#.to_string(),
    )
    .await;
    mount_text(&mock_server, "/deep.txt", "deep").await;

    let output = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", mock_server.uri()), &output);
    config.maximum_depth = 2;

    let summary = crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.downloads_completed, 1);
    assert!(local_target(&output, "deep.txt").exists());
}

#[tokio::test]
async fn test_link_and_image_to_same_file() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<a href="/test.txt">link</a><img src="/test.txt">"#.to_string(),
    )
    .await;
    mount_text(&mock_server, "/test.txt", "once").await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", mock_server.uri()), &output);

    let summary = crawl(config).await.expect("Crawl failed");

    // One classification request and one transfer
    assert_eq!(requests_to(&mock_server, "/test.txt").await, 2);
    assert_eq!(summary.downloads_completed, 1);
}

#[tokio::test]
async fn test_extension_match_skips_classification() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<a href="/archive.zip">zip</a><a href="/archive.zip#again">zip</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/archive.zip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(vec![0u8; 2048], "application/zip"),
        )
        .mount(&mock_server)
        .await;

    let output = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", mock_server.uri()), &output);
    config.mime_types.clear();
    config.file_extensions.insert("zip".to_string());

    let summary = crawl(config).await.expect("Crawl failed");

    assert_eq!(requests_to(&mock_server, "/archive.zip").await, 1);
    assert_eq!(summary.bytes_downloaded, 2048);
    assert_eq!(
        std::fs::metadata(local_target(&output, "archive.zip"))
            .unwrap()
            .len(),
        2048
    );
}

/// Client that sends `example.com` and `sub.example.com` to the mock server
fn subdomain_fetcher(config: &CrawlConfig, server: &MockServer) -> Arc<HttpFetcher> {
    let address = *server.address();
    let client = client_builder(&config.http)
        .unwrap()
        .resolve("example.com", address)
        .resolve("sub.example.com", address)
        .build()
        .unwrap();
    Arc::new(HttpFetcher::with_client(client))
}

async fn run_subdomain_crawl(include_subdomains: bool) -> (MockServer, TempDir) {
    let mock_server = MockServer::start().await;
    let port = mock_server.address().port();

    mount_html(
        &mock_server,
        "/",
        format!(
            r#"<a href="http://sub.example.com:{}/sub.txt">sub</a>"#,
            port
        ),
    )
    .await;
    mount_text(&mock_server, "/sub.txt", "from the subdomain").await;

    let output = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("http://example.com:{}/", port), &output);
    config.include_subdomains = include_subdomains;

    let fetcher = subdomain_fetcher(&config, &mock_server);
    Coordinator::new(config, fetcher)
        .run()
        .await
        .expect("Crawl failed");

    (mock_server, output)
}

#[tokio::test]
async fn test_subdomain_excluded_by_default() {
    let (mock_server, output) = run_subdomain_crawl(false).await;

    assert_eq!(requests_to(&mock_server, "/").await, 1);
    assert_eq!(requests_to(&mock_server, "/sub.txt").await, 0);
    assert!(!output.path().join("sub.example.com").exists());
}

#[tokio::test]
async fn test_subdomain_included_when_enabled() {
    let (mock_server, output) = run_subdomain_crawl(true).await;

    assert!(requests_to(&mock_server, "/sub.txt").await >= 1);
    assert_eq!(
        std::fs::read_to_string(output.path().join("sub.example.com/sub.txt")).unwrap(),
        "from the subdomain"
    );
}

#[tokio::test]
async fn test_failing_sibling_does_not_stop_crawl() {
    let mock_server = MockServer::start().await;

    // Reserve a port and release it so nothing listens there
    let closed_port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    mount_html(
        &mock_server,
        "/",
        format!(
            r#"<a href="http://127.0.0.1:{}/test2.txt">broken</a><a href="/test.txt">ok</a>"#,
            closed_port
        ),
    )
    .await;
    mount_text(&mock_server, "/test.txt", "still here").await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", mock_server.uri()), &output);

    let summary = crawl(config).await.expect("Crawl must complete despite the failure");

    assert_eq!(summary.classification_failures, 1);
    assert_eq!(summary.downloads_completed, 1);
    assert_eq!(
        std::fs::read_to_string(local_target(&output, "test.txt")).unwrap(),
        "still here"
    );
    assert!(!local_target(&output, "test2.txt").exists());
}

#[tokio::test]
async fn test_existing_file_not_overwritten() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<a href="/test.txt">file</a>"#.to_string(),
    )
    .await;
    mount_text(&mock_server, "/test.txt", "fresh").await;

    let output = TempDir::new().unwrap();
    let existing = local_target(&output, "test.txt");
    std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
    std::fs::write(&existing, "stale").unwrap();

    let config = create_test_config(&format!("{}/", mock_server.uri()), &output);
    let summary = crawl(config).await.expect("Crawl failed");

    // Classified, but never transferred
    assert_eq!(requests_to(&mock_server, "/test.txt").await, 1);
    assert_eq!(summary.downloads_skipped, 1);
    assert_eq!(std::fs::read_to_string(&existing).unwrap(), "stale");
}

#[tokio::test]
async fn test_existing_file_overwritten_when_enabled() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<a href="/test.txt">file</a>"#.to_string(),
    )
    .await;
    mount_text(&mock_server, "/test.txt", "fresh").await;

    let output = TempDir::new().unwrap();
    let existing = local_target(&output, "test.txt");
    std::fs::create_dir_all(existing.parent().unwrap()).unwrap();
    std::fs::write(&existing, "stale").unwrap();

    let mut config = create_test_config(&format!("{}/", mock_server.uri()), &output);
    config.overwrite_existing_files = true;
    crawl(config).await.expect("Crawl failed");

    assert_eq!(std::fs::read_to_string(&existing).unwrap(), "fresh");
}

#[tokio::test]
async fn test_links_resolved_after_redirect() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("location", format!("{}/docs/", mock_server.uri()).as_str()),
        )
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/docs/",
        r#"<a href="notes.txt">notes</a>"#.to_string(),
    )
    .await;
    mount_text(&mock_server, "/docs/notes.txt", "relative to the target").await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", mock_server.uri()), &output);

    let summary = crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.downloads_completed, 1);
    assert!(local_target(&output, "docs/notes.txt").exists());
}

#[tokio::test]
async fn test_error_status_is_not_downloaded() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<a href="/missing.txt">gone</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/missing.txt"))
        .respond_with(ResponseTemplate::new(404).insert_header("content-type", "text/plain"))
        .mount(&mock_server)
        .await;

    let output = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/", mock_server.uri()), &output);

    let summary = crawl(config).await.expect("Crawl failed");

    assert_eq!(requests_to(&mock_server, "/missing.txt").await, 1);
    assert_eq!(summary.downloads_completed, 0);
    assert_eq!(summary.ignored, 1);
}

#[tokio::test]
async fn test_uri_ceiling() {
    let mock_server = MockServer::start().await;
    mount_html(
        &mock_server,
        "/",
        r#"<a href="/a.txt">a</a><a href="/b.txt">b</a><a href="/c.txt">c</a>"#.to_string(),
    )
    .await;
    for file in ["/a.txt", "/b.txt", "/c.txt"] {
        mount_text(&mock_server, file, "x").await;
    }

    let output = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/", mock_server.uri()), &output);
    config.maximum_uris = 2;

    let summary = crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.admitted, 2);
    assert_eq!(summary.rejected, 2);
    assert_eq!(summary.downloads_completed, 1);
}
