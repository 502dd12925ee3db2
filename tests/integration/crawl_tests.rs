//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use keystone_crawler::config::Config;
use keystone_crawler::crawler::Coordinator;
use keystone_crawler::extract::{parse_date, ArticleExtractor, ExtractResult, ExtractedArticle};
use keystone_crawler::output::OutputError;
use keystone_crawler::state::RequestOutcome;
use keystone_crawler::{AllowedDomains, KeystoneError};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `seeds` and writing into `output`
fn create_test_config(seeds: Vec<String>, output: &Path) -> Config {
    let mut config = Config::default();
    config.seeds = seeds;
    config.crawler.autothrottle_enabled = false;
    config.crawler.download_delay = 0.0;
    config.crawler.retry_times = 0;
    config.crawler.request_timeout = 5.0;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.directory = output.to_string_lossy().into_owned();
    config
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn article_page(title: &str, published: &str) -> String {
    format!(
        r#"<html><head>
        <title>{title} | Test Gazette</title>
        <meta property="article:published_time" content="{published}">
        </head><body><article>
        <p>{title}: the full story, with enough words to count as a paragraph.</p>
        </article></body></html>"#
    )
}

/// Reads every row of the output file, header included
fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .expect("Failed to open output file");

    reader
        .records()
        .map(|r| {
            r.expect("Malformed CSV row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}

fn header() -> Vec<String> {
    vec![
        "Title".to_string(),
        "Content".to_string(),
        "Publish Date".to_string(),
        "URL".to_string(),
    ]
}

#[tokio::test]
async fn test_crawl_writes_dated_articles_and_follows_pagination() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<html><body>
            <a href="/news/one">One</a>
            <a href="/news/two">Two</a>
            <a class="next" href="/page/2">Next</a>
            </body></html>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news/one"))
        .respond_with(html(article_page("School board election", "2024-05-01T08:00:00-04:00")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news/two"))
        .respond_with(html(article_page("Bridge reopens", "2024-05-02T09:30:00-04:00")))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page/2"))
        .respond_with(html(
            r#"<html><body><p>Older stories</p>
            <a href="/news/three">Three</a>
            </body></html>"#
                .to_string(),
        ))
        .expect(1..)
        .mount(&mock_server)
        .await;

    // Only linked from page 2
    Mock::given(method("GET"))
        .and(path("/news/three"))
        .respond_with(html(article_page("Library expands hours", "2024-04-28T12:00:00-04:00")))
        .expect(1..)
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = create_test_config(vec![format!("{}/", base_url)], temp.path());

    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let output = coordinator.output_path();
    let stats = coordinator.run().await.expect("Crawl failed");

    let rows = read_rows(&output);
    assert_eq!(rows.len(), 4, "header plus three articles: {:?}", rows);
    assert_eq!(rows[0], header());

    let mut titles: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
    titles.sort();
    assert_eq!(
        titles,
        vec!["Bridge reopens", "Library expands hours", "School board election"]
    );

    let one = rows
        .iter()
        .find(|r| r[3] == format!("{}/news/one", base_url))
        .expect("article one missing");
    assert_eq!(one[2], "2024-05-01 08:00:00-04:00");
    assert!(one[1].starts_with("School board election: the full story"));

    assert_eq!(stats.articles_written(), 3);
    // The seed and page 2 were both crawled for links
    assert_eq!(stats.count(RequestOutcome::Crawled), 2);
    assert!(stats.count(RequestOutcome::NotArticle) >= 1);
}

#[tokio::test]
async fn test_page_without_publish_date_writes_no_row() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/about">About us</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html(
            "<html><head><title>About</title></head><body><p>We cover the valley since 1901.</p></body></html>"
                .to_string(),
        ))
        .expect(1..)
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = create_test_config(vec![format!("{}/", base_url)], temp.path());

    let coordinator = Coordinator::new(config).unwrap();
    let output = coordinator.output_path();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(read_rows(&output), vec![header()]);
    assert_eq!(stats.count(RequestOutcome::NotArticle), 1);
    assert_eq!(stats.articles_written(), 0);
}

#[tokio::test]
async fn test_offsite_links_are_never_requested() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let port = Url::parse(&base_url).unwrap().port().unwrap();

    // Same server, different host name: outside the allowed domains
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(format!(
            r#"<a href="http://localhost:{}/offsite">Partner site</a>"#,
            port
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/offsite"))
        .respond_with(html(article_page("Elsewhere", "2024-05-03")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = create_test_config(vec![format!("{}/", base_url)], temp.path());

    let coordinator = Coordinator::new(config).unwrap();
    let output = coordinator.output_path();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(stats.count(RequestOutcome::Offsite), 1);
    assert_eq!(read_rows(&output), vec![header()]);
}

#[tokio::test]
async fn test_article_timeout_leaves_header_only() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/slow-story">Slow</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow-story"))
        .respond_with(
            html(article_page("Slow story", "2024-05-04")).set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let mut config = create_test_config(vec![format!("{}/", base_url)], temp.path());
    config.crawler.request_timeout = 1.0;

    let coordinator = Coordinator::new(config).unwrap();
    let output = coordinator.output_path();
    let stats = coordinator.run().await.expect("Timeouts must not fail the crawl");

    assert_eq!(read_rows(&output), vec![header()]);
    assert_eq!(stats.count(RequestOutcome::NetworkError), 1);
}

#[tokio::test]
async fn test_missing_output_directory_is_fatal() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("does-not-exist");
    let config = create_test_config(vec!["https://example.com/".to_string()], &missing);

    match Coordinator::new(config) {
        Err(KeystoneError::Output(OutputError::MissingDirectory(dir))) => assert_eq!(dir, missing),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("coordinator created without an output directory"),
    }
    assert!(!missing.exists());
}

#[tokio::test]
async fn test_depth_limit_stops_pagination() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a class="next" href="/page/2">Next</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page/2"))
        .respond_with(html(r#"<a class="next" href="/page/3">Next</a>"#.to_string()))
        .expect(1..)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page/3"))
        .respond_with(html("<html></html>".to_string()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let mut config = create_test_config(vec![format!("{}/", base_url)], temp.path());
    config.crawler.max_depth = 1;

    let stats = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.count(RequestOutcome::DepthExceeded), 2);
}

#[tokio::test]
async fn test_reuse_crawl_response_fetches_article_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/news/once">Once</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news/once"))
        .respond_with(html(article_page("Fetched once", "2024-05-05")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let mut config = create_test_config(vec![format!("{}/", base_url)], temp.path());
    config.extraction.reuse_crawl_response = true;

    let coordinator = Coordinator::new(config).unwrap();
    let output = coordinator.output_path();
    coordinator.run().await.unwrap();

    let rows = read_rows(&output);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "Fetched once");
}

#[tokio::test]
async fn test_default_extractor_downloads_article_again() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/news/twice">Twice</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news/twice"))
        .respond_with(html(article_page("Fetched twice", "2024-05-06")))
        .expect(2)
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = create_test_config(vec![format!("{}/", base_url)], temp.path());

    let stats = Coordinator::new(config).unwrap().run().await.unwrap();
    assert_eq!(stats.articles_written(), 1);
}

#[tokio::test]
async fn test_http_errors_do_not_stop_the_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/gone">Gone</a> <a href="/news/fine">Fine</a>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news/fine"))
        .respond_with(html(article_page("Still here", "2024-05-07")))
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = create_test_config(vec![format!("{}/", base_url)], temp.path());

    let stats = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(stats.count(RequestOutcome::HttpError), 1);
    assert_eq!(stats.articles_written(), 1);
}

/// Extractor that accepts every page and counts its calls
#[derive(Default)]
struct CountingExtractor {
    calls: Arc<AtomicUsize>,
}

impl ArticleExtractor for CountingExtractor {
    async fn extract(
        &self,
        url: &Url,
        _crawled_body: &str,
    ) -> ExtractResult<Option<ExtractedArticle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(ExtractedArticle {
            title: Some(url.path().to_string()),
            text: String::new(),
            publish_date: parse_date("2024-01-01").expect("valid date"),
        }))
    }
}

#[tokio::test]
async fn test_custom_extractor() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/a">A</a> <a href="/b">B</a> <a href="/a#comments">A again</a>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html("<html><body>plain</body></html>".to_string()))
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = create_test_config(vec![format!("{}/", base_url)], temp.path());

    let extractor = CountingExtractor::default();
    let calls = extractor.calls.clone();

    let coordinator = Coordinator::with_extractor(config, extractor).unwrap();
    let output = coordinator.output_path();
    let stats = coordinator.run().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(stats.count(RequestOutcome::Duplicate), 1);

    let rows = read_rows(&output);
    let mut titles: Vec<&str> = rows[1..].iter().map(|r| r[0].as_str()).collect();
    titles.sort();
    assert_eq!(titles, vec!["/a", "/b"]);
}

/// Extractor that panics on every page
struct PanickingExtractor;

impl ArticleExtractor for PanickingExtractor {
    async fn extract(
        &self,
        url: &Url,
        _crawled_body: &str,
    ) -> ExtractResult<Option<ExtractedArticle>> {
        panic!("extractor blew up on {}", url);
    }
}

#[tokio::test]
async fn test_worker_panic_is_counted() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/x">X</a> <a href="/y">Y</a>"#.to_string()))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .respond_with(html("<html></html>".to_string()))
        .mount(&mock_server)
        .await;

    let temp = TempDir::new().unwrap();
    let config = create_test_config(vec![format!("{}/", base_url)], temp.path());

    let coordinator = Coordinator::with_extractor(config, PanickingExtractor).unwrap();
    let output = coordinator.output_path();
    let stats = coordinator.run().await.expect("Panicking workers must not fail the crawl");

    assert_eq!(stats.count(RequestOutcome::WorkerFailed), 2);
    assert_eq!(stats.count(RequestOutcome::Crawled), 1);
    assert_eq!(read_rows(&output), vec![header()]);
}

#[test]
fn test_www_and_bare_seed_share_one_domain() {
    let seeds = vec![
        "https://www.example.org/".to_string(),
        "https://example.org/local".to_string(),
    ];
    let allowed = AllowedDomains::from_seeds(&seeds);

    assert_eq!(allowed.iter().collect::<Vec<_>>(), vec!["example.org"]);
}

#[test]
fn test_builtin_seeds_are_valid() {
    let config = Config::default();
    let allowed = AllowedDomains::from_seeds(&config.seeds);

    assert!(keystone_crawler::config::validate(&config).is_ok());
    assert!(!allowed.is_empty());
    assert!(allowed.contains("pennlive.com"));
}
