//! Integration tests for the crawler
//!
//! Most tests drive the dispatcher with an in-memory fetcher so link graphs
//! can be shaped exactly; the last ones use wiremock to run the full
//! HTTP-to-document cycle end-to-end.

use async_trait::async_trait;
use site_scribe::config::{Config, OutputFormat};
use site_scribe::crawler::{Dispatcher, FetchError, Fetcher};
use site_scribe::output::{DocumentSink, OutputResult};
use site_scribe::ContentElement;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves fixed markup and counts how often each URL is requested
struct CountingFetcher {
    pages: HashMap<String, String>,
    requests: Mutex<HashMap<String, usize>>,
}

impl CountingFetcher {
    fn new(pages: Vec<(String, String)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            requests: Mutex::new(HashMap::new()),
        }
    }

    fn requests(&self) -> HashMap<String, usize> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        *self
            .requests
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        // Give other workers a chance to race on the same links
        tokio::time::sleep(Duration::from_millis(2)).await;

        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::NotFound(url.to_string()))
    }
}

#[derive(Default)]
struct RecordingSink {
    sections: Vec<(String, Vec<ContentElement>)>,
    finalized: usize,
}

impl DocumentSink for RecordingSink {
    fn append_section(&mut self, title: &str, elements: &[ContentElement]) -> OutputResult<()> {
        self.sections.push((title.to_string(), elements.to_vec()));
        Ok(())
    }

    fn finalize(&mut self) -> OutputResult<()> {
        self.finalized += 1;
        Ok(())
    }
}

fn test_config(workers: usize) -> Config {
    let mut config = Config::new("http://ex.com/", "unused.md");
    config.crawler.worker_count = workers;
    config.crawler.settle_delay_ms = 0;
    config
}

fn page(url: &str, html: &str) -> (String, String) {
    (url.to_string(), html.to_string())
}

#[tokio::test]
async fn test_cycle_visits_each_page_once() {
    let fetcher = Arc::new(CountingFetcher::new(vec![
        page(
            "http://ex.com/",
            r#"<h1>A</h1><a href="/b">b</a><a href="/c">c</a>"#,
        ),
        page("http://ex.com/b", r#"<h1>B</h1><a href="/">back</a>"#),
        page("http://ex.com/c", r#"<h1>C</h1><a href="/b">b</a>"#),
    ]));
    let dispatcher = Dispatcher::new(&test_config(3), fetcher.clone()).unwrap();
    let mut sink = RecordingSink::default();

    let stats = tokio::time::timeout(Duration::from_secs(10), dispatcher.run(&mut sink))
        .await
        .expect("crawl should terminate")
        .unwrap();

    assert_eq!(stats.pages_visited, 3);
    assert_eq!(stats.pages_processed, 3);
    assert_eq!(sink.finalized, 1);
    assert_eq!(sink.sections.len(), 3);
    assert!(fetcher.requests().values().all(|&count| count == 1));
}

#[tokio::test]
async fn test_no_duplicate_fetches_under_contention() {
    const PAGES: usize = 24;

    let links: String = (0..PAGES)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    let mut pages = vec![page("http://ex.com/", &links)];
    for i in 0..PAGES {
        pages.push(page(
            &format!("http://ex.com/p{}", i),
            &format!("<p>Page {}</p>{}", i, links),
        ));
    }

    let fetcher = Arc::new(CountingFetcher::new(pages));
    let dispatcher = Dispatcher::new(&test_config(8), fetcher.clone()).unwrap();
    let mut sink = RecordingSink::default();

    let stats = dispatcher.run(&mut sink).await.unwrap();

    let requests = fetcher.requests();
    assert_eq!(requests.len(), PAGES + 1);
    assert!(requests.values().all(|&count| count == 1));

    let titles: BTreeSet<&str> = sink.sections.iter().map(|(t, _)| t.as_str()).collect();
    assert_eq!(titles.len(), PAGES + 1);
    assert_eq!(stats.pages_visited, (PAGES + 1) as u64);
}

#[tokio::test]
async fn test_only_same_domain_links_followed() {
    let fetcher = Arc::new(CountingFetcher::new(vec![
        page(
            "http://ex.com/",
            r#"<a href="/b?x=1#frag">b</a>
               <a href="mailto:someone@ex.com">mail</a>
               <a href="javascript:void(0)">js</a>
               <a href="http://other.com/c">other</a>
               <a href="/cdn-cgi/l/email-protection">protected</a>
               <a href="/b">b again</a>"#,
        ),
        page("http://ex.com/b", "<p>B</p>"),
    ]));
    let dispatcher = Dispatcher::new(&test_config(2), fetcher.clone()).unwrap();
    let mut sink = RecordingSink::default();

    dispatcher.run(&mut sink).await.unwrap();

    let fetched: BTreeSet<String> = fetcher.requests().into_keys().collect();
    let expected: BTreeSet<String> = ["http://ex.com/", "http://ex.com/b"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(fetched, expected);
}

#[tokio::test]
async fn test_empty_table_produces_no_table_element() {
    let fetcher = Arc::new(CountingFetcher::new(vec![page(
        "http://ex.com/",
        "<table><tr></tr></table><p>after</p>",
    )]));
    let dispatcher = Dispatcher::new(&test_config(1), fetcher).unwrap();
    let mut sink = RecordingSink::default();

    dispatcher.run(&mut sink).await.unwrap();

    assert_eq!(
        sink.sections[0].1,
        vec![ContentElement::Paragraph {
            text: "after".to_string()
        }]
    );
}

#[tokio::test]
async fn test_depth_first_traversal_terminates() {
    let fetcher = Arc::new(CountingFetcher::new(vec![
        page("http://ex.com/", r#"<a href="/a">a</a><a href="/b">b</a>"#),
        page("http://ex.com/a", r#"<a href="/a/1">1</a>"#),
        page("http://ex.com/a/1", "<p>leaf</p>"),
        page("http://ex.com/b", "<p>b</p>"),
    ]));
    let mut config = test_config(1);
    config.crawler.traversal = site_scribe::config::TraversalOrder::DepthFirst;
    let dispatcher = Dispatcher::new(&config, fetcher).unwrap();
    let mut sink = RecordingSink::default();

    let stats = dispatcher.run(&mut sink).await.unwrap();

    assert_eq!(stats.pages_processed, 4);
    assert_eq!(sink.sections[0].0, "Page: http://ex.com/");
}

async fn mount_page(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_to_markdown() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        200,
        r#"<html><body>
            <nav><a href="/about">About</a></nav>
            <h1>Home</h1>
            <p>Welcome to the site.</p>
            <a href="/about">About us</a>
            <a href="/broken">Broken</a>
            <a href="https://elsewhere.example/">Elsewhere</a>
        </body></html>"#,
    )
    .await;
    mount_page(
        &server,
        "/about",
        200,
        r#"<html><body>
            <h2>About</h2>
            <ul><li>one</li><li>two</li></ul>
            <table><tr><th>k</th><th>v</th></tr><tr><td>a</td><td>1</td></tr></table>
            <a href="/">Home</a>
        </body></html>"#,
    )
    .await;
    mount_page(&server, "/broken", 500, "oops").await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("site.md");
    let mut config = Config::new(format!("{}/", base), destination.to_string_lossy());
    config.crawler.worker_count = 3;
    config.crawler.settle_delay_ms = 0;

    let stats = site_scribe::crawl(config).await.unwrap();

    assert_eq!(stats.pages_visited, 3);
    assert_eq!(stats.pages_processed, 2);
    assert_eq!(stats.pages_failed, 1);

    let document = std::fs::read_to_string(&destination).unwrap();
    assert!(document.contains(&format!("# Page: {}/\n", base)));
    assert!(document.contains(&format!("# Page: {}/about\n", base)));
    assert!(document.contains(&format!("# Page: {}/broken\n", base)));
    assert!(document.contains("## Home"));
    assert!(document.contains("Welcome to the site."));
    assert!(document.contains("### About"));
    assert!(document.contains("- one\n- two\n"));
    assert!(document.contains("| k | v |\n|---|---|\n| a | 1 |\n"));
}

#[tokio::test]
async fn test_full_crawl_with_site_chrome_to_sqlite() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        200,
        r#"<html><body>
            <header><p>Brand</p></header>
            <h1>Home</h1>
            <a href="/next">Next</a>
            <footer><p>Copyright</p></footer>
        </body></html>"#,
    )
    .await;
    mount_page(&server, "/next", 200, "<p>Next page</p>").await;

    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("site.db");
    let mut config = Config::new(format!("{}/", base), destination.to_string_lossy());
    config.crawler.worker_count = 2;
    config.crawler.settle_delay_ms = 0;
    config.crawler.capture_site_chrome = true;
    config.output.format = OutputFormat::Sqlite;

    let stats = site_scribe::crawl(config).await.unwrap();
    assert_eq!(stats.pages_processed, 2);

    let conn = rusqlite::Connection::open(&destination).unwrap();
    let mut stmt = conn
        .prepare("SELECT title FROM sections ORDER BY position")
        .unwrap();
    let titles: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        titles,
        vec![
            "Header".to_string(),
            "Footer".to_string(),
            format!("Page: {}/", base),
            format!("Page: {}/next", base),
        ]
    );
}
