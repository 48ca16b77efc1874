//! Integration tests for the crawler
//!
//! Most tests swap in a canned fetcher so crawls are deterministic; the
//! wiremock tests run the real HTTP fetcher end-to-end.

use crate::support::{config, html, CollectingReporter, HangingFetcher, MockFetcher};
use crwl::crawler::PageParser;
use crwl::state::UrlState;
use crwl::{CrawlStatus, Crawler, CrwlError, Page, ParseError};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIMIT: Duration = Duration::from_secs(10);

fn example_site() -> MockFetcher {
    MockFetcher::new()
        .page(
            "https://example.com",
            &html(&[
                "/loans",
                "https://example.com/shared-tabs/",
                "https://twitter.com/example",
                "mailto:help@example.com",
            ]),
        )
        .page(
            "https://example.com/loans",
            &html(&["/", "/shared-tabs", "https://www.facebook.com/example"]),
        )
        .page(
            "https://example.com/shared-tabs",
            &html(&["/loans#apply", "https://example.com"]),
        )
}

#[tokio::test]
async fn test_crawl_visits_every_known_page() {
    let reporter = Arc::new(CollectingReporter::default());
    let crawler = Crawler::new(config("https://example.com/"))
        .unwrap()
        .with_fetcher(example_site())
        .with_reporter(reporter.clone());

    let report = tokio::time::timeout(LIMIT, crawler.crawl())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.stats.completed, 3);
    assert_eq!(report.stats.failures, 0);
    assert_eq!(report.stats.pending, 0);
    assert!(report.stats.is_balanced());
    assert!(report.stats.duration.is_some());

    for url in [
        "https://example.com",
        "https://example.com/loans",
        "https://example.com/shared-tabs",
    ] {
        assert!(crawler.graph().has_node(url), "expected {} to be visited", url);
        assert_eq!(crawler.states().get(url), Some(UrlState::Completed));
    }
    assert!(!crawler.graph().has_node("https://twitter.com/example"));
    assert_eq!(report.nodes, 3);

    let mut pages = reporter.pages.lock().clone();
    pages.sort();
    assert_eq!(
        pages,
        vec![
            "https://example.com",
            "https://example.com/loans",
            "https://example.com/shared-tabs",
        ]
    );
}

#[tokio::test]
async fn test_crawl_error_reports_failed_seed() {
    let reporter = Arc::new(CollectingReporter::default());
    let crawler = Crawler::new(config("https://test.com"))
        .unwrap()
        .with_fetcher(example_site())
        .with_reporter(reporter.clone());

    let report = tokio::time::timeout(LIMIT, crawler.crawl())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.stats.failures, 1);
    assert_eq!(report.stats.completed, 0);
    assert_eq!(report.stats.pending, 0);
    assert_eq!(
        crawler.states().get("https://test.com"),
        Some(UrlState::FetchFailed)
    );

    let failures = reporter.failures.lock();
    assert_eq!(failures.len(), 1);
    assert!(
        failures[0].contains("failed to fetch https://test.com"),
        "unexpected failure message: {}",
        failures[0]
    );
}

#[tokio::test]
async fn test_chain_of_pages() {
    let fetcher = MockFetcher::new()
        .page("https://example.com", &html(&["/a"]))
        .page("https://example.com/a", &html(&["/b"]))
        .page("https://example.com/b", &html(&["/c"]))
        .page("https://example.com/c", &html(&[]));
    let crawler = Crawler::new(config("https://example.com"))
        .unwrap()
        .with_fetcher(fetcher)
        .with_reporter(Arc::new(CollectingReporter::default()));

    let report = tokio::time::timeout(LIMIT, crawler.crawl())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.stats.completed, 4);
    assert_eq!(report.stats.failures, 0);
    assert_eq!(report.nodes, 4);
    assert_eq!(report.edges, 3);

    let graph = crawler.graph();
    assert!(graph.has_edge("https://example.com", "https://example.com/a"));
    assert!(graph.has_edge("https://example.com/a", "https://example.com/b"));
    assert!(graph.has_edge("https://example.com/b", "https://example.com/c"));
    assert_eq!(graph.neighbors("https://example.com/c"), Some(vec![]));
}

#[tokio::test]
async fn test_shared_link_fetched_once() {
    let fetcher = MockFetcher::new()
        .page("https://example.com", &html(&["/a", "/b"]))
        .page("https://example.com/a", &html(&["/c"]))
        .page("https://example.com/b", &html(&["/c"]))
        .page("https://example.com/c", &html(&[]));
    let calls = fetcher.calls();
    let crawler = Crawler::new(config("https://example.com"))
        .unwrap()
        .with_fetcher(fetcher)
        .with_reporter(Arc::new(CollectingReporter::default()));

    let report = tokio::time::timeout(LIMIT, crawler.crawl())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(calls.lock().get("https://example.com/c"), Some(&1));
    assert_eq!(report.stats.total, 4);
    assert_eq!(report.stats.completed, 4);

    let graph = crawler.graph();
    assert!(graph.has_edge("https://example.com/a", "https://example.com/c"));
    assert!(graph.has_edge("https://example.com/b", "https://example.com/c"));
}

#[tokio::test]
async fn test_seed_spelling_shares_root_node() {
    for seed in [
        "https://Example.com",
        "https://example.com:443",
        "https://example.com/?",
    ] {
        let fetcher = MockFetcher::new()
            .page("https://example.com", &html(&["/", "/a"]))
            .page("https://example.com/a", &html(&["/", "https://example.com/"]));
        let calls = fetcher.calls();
        let crawler = Crawler::new(config(seed))
            .unwrap()
            .with_fetcher(fetcher)
            .with_reporter(Arc::new(CollectingReporter::default()));

        let report = tokio::time::timeout(LIMIT, crawler.crawl())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(crawler.seed_url(), "https://example.com");
        assert_eq!(report.stats.total, 2, "seed {}", seed);
        assert_eq!(report.stats.completed, 2, "seed {}", seed);
        assert_eq!(report.stats.failures, 0, "seed {}", seed);
        assert_eq!(report.nodes, 2, "seed {}", seed);

        let calls = calls.lock();
        assert_eq!(calls.get("https://example.com"), Some(&1), "seed {}", seed);
        assert_eq!(calls.get("https://example.com/a"), Some(&1), "seed {}", seed);
        assert_eq!(calls.len(), 2, "seed {} fetched {:?}", seed, calls);

        assert!(crawler
            .graph()
            .has_edge("https://example.com/a", "https://example.com"));
    }
}

#[tokio::test]
async fn test_densely_linked_site_dispatches_each_url_once() {
    let urls: Vec<String> = (0..40)
        .map(|i| format!("https://example.com/p{}", i))
        .collect();
    let hrefs: Vec<&str> = urls.iter().map(String::as_str).collect();
    let body = html(&hrefs);

    let mut fetcher = MockFetcher::new().page("https://example.com", &body);
    for url in &urls {
        fetcher = fetcher.page(url, &body);
    }
    let calls = fetcher.calls();

    let mut config = config("https://example.com");
    config.crawler.workers = 8;
    let crawler = Crawler::new(config)
        .unwrap()
        .with_fetcher(fetcher)
        .with_reporter(Arc::new(CollectingReporter::default()));

    let report = tokio::time::timeout(LIMIT, crawler.crawl())
        .await
        .unwrap()
        .unwrap();

    let calls = calls.lock();
    assert_eq!(calls.len(), 41);
    assert!(calls.values().all(|&n| n == 1), "a URL was fetched twice");
    assert_eq!(report.stats.total, 41);
    assert_eq!(report.stats.completed, 41);
    // The seed links to every page and every page links to every page
    assert_eq!(report.edges, 40 * 41);
}

#[tokio::test]
async fn test_fan_out_larger_than_queue_capacity() {
    let urls: Vec<String> = (0..300)
        .map(|i| format!("https://example.com/item/{}", i))
        .collect();
    let hrefs: Vec<&str> = urls.iter().map(String::as_str).collect();

    let mut fetcher = MockFetcher::new().page("https://example.com", &html(&hrefs));
    for url in &urls {
        fetcher = fetcher.page(url, &html(&["/"]));
    }

    let mut config = config("https://example.com");
    config.crawler.workers = 2;
    config.crawler.queue_capacity = 1;
    let crawler = Crawler::new(config)
        .unwrap()
        .with_fetcher(fetcher)
        .with_reporter(Arc::new(CollectingReporter::default()));

    let report = tokio::time::timeout(LIMIT, crawler.crawl())
        .await
        .expect("crawl should not deadlock under backpressure")
        .unwrap();

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.stats.completed, 301);
    assert!(report.stats.is_balanced());
}

#[tokio::test]
async fn test_every_url_ends_terminal() {
    let fetcher = example_site()
        .page("https://example.com/broken-parent", &html(&["/gone"]))
        .raw("https://example.com/binary", vec![0xff, 0xfe, 0x00])
        .page(
            "https://example.com",
            &html(&["/loans", "/broken-parent", "/binary"]),
        );
    let crawler = Crawler::new(config("https://example.com"))
        .unwrap()
        .with_fetcher(fetcher)
        .with_reporter(Arc::new(CollectingReporter::default()));

    let report = tokio::time::timeout(LIMIT, crawler.crawl())
        .await
        .unwrap()
        .unwrap();

    assert!(crawler.states().all_terminal(), "{:?}", crawler.states().unfinished());
    assert_eq!(
        crawler.states().get("https://example.com/gone"),
        Some(UrlState::FetchFailed)
    );
    assert_eq!(
        crawler.states().get("https://example.com/binary"),
        Some(UrlState::ParseFailed)
    );
    assert_eq!(report.stats.failures, 2);
    assert_eq!(
        report.stats.total,
        report.stats.completed + report.stats.failures
    );
}

#[tokio::test]
async fn test_cancel_stops_hanging_crawl() {
    let crawler = Arc::new(
        Crawler::new(config("https://example.com"))
            .unwrap()
            .with_fetcher(HangingFetcher)
            .with_reporter(Arc::new(CollectingReporter::default())),
    );
    let cancel = crawler.cancel_token();

    let handle = {
        let crawler = crawler.clone();
        tokio::spawn(async move { crawler.crawl().await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();

    let report = tokio::time::timeout(LIMIT, handle)
        .await
        .expect("crawl should stop after cancel")
        .unwrap()
        .unwrap();

    assert_eq!(report.status, CrawlStatus::Cancelled);
    assert_eq!(report.abort_reason, None);
    assert_eq!(report.stats.pending, 1);
    assert_eq!(
        crawler.states().get("https://example.com"),
        Some(UrlState::Fetching)
    );
}

#[tokio::test]
async fn test_abort_on_seed_failure() {
    let mut config = config("https://test.com");
    config.crawler.abort_on_seed_failure = true;
    let crawler = Crawler::new(config)
        .unwrap()
        .with_fetcher(example_site())
        .with_reporter(Arc::new(CollectingReporter::default()));

    let report = tokio::time::timeout(LIMIT, crawler.crawl())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.status, CrawlStatus::Aborted);
    assert!(report
        .abort_reason
        .as_deref()
        .unwrap()
        .contains("https://test.com"));
    assert_eq!(report.stats.failures, 1);
}

#[tokio::test]
async fn test_crawl_twice_fails() {
    let crawler = Crawler::new(config("https://example.com"))
        .unwrap()
        .with_fetcher(example_site())
        .with_reporter(Arc::new(CollectingReporter::default()));

    tokio::time::timeout(LIMIT, crawler.crawl())
        .await
        .unwrap()
        .unwrap();
    let second = crawler.crawl().await;

    assert!(matches!(second, Err(CrwlError::AlreadyStarted)));
}

struct PanickingParser;

impl PageParser for PanickingParser {
    fn parse(&self, _root: &str, _page_url: &str, _body: &[u8]) -> Result<Page, ParseError> {
        panic!("parser exploded");
    }
}

#[tokio::test]
async fn test_panicking_parser_is_a_failure() {
    let crawler = Crawler::new(config("https://example.com"))
        .unwrap()
        .with_fetcher(example_site())
        .with_parser(PanickingParser)
        .with_reporter(Arc::new(CollectingReporter::default()));

    let report = tokio::time::timeout(LIMIT, crawler.crawl())
        .await
        .expect("a panicking parser must not leak outstanding work")
        .unwrap();

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.stats.failures, 1);
    assert_eq!(
        crawler.states().get("https://example.com"),
        Some(UrlState::ParseFailed)
    );
}

#[tokio::test]
async fn test_invalid_config_rejected() {
    let mut config = config("https://example.com");
    config.crawler.workers = 0;
    assert!(matches!(Crawler::new(config), Err(CrwlError::Config(_))));
}

#[tokio::test]
async fn test_full_crawl_over_http() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let absolute_page2 = format!("{}/page2", base_url);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html(&[
                    "/page1",
                    absolute_page2.as_str(),
                    "/missing",
                    "https://other.example.org/",
                ]))
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html(&["/", "/page2"]))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(html(&[]))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let reporter = Arc::new(CollectingReporter::default());
    let mut config = config(&base_url);
    config.crawler.request_timeout_ms = 5_000;
    let crawler = Crawler::new(config).unwrap().with_reporter(reporter.clone());

    let report = tokio::time::timeout(LIMIT, crawler.crawl())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.status, CrawlStatus::Completed);
    assert_eq!(report.stats.completed, 3);
    assert_eq!(report.stats.failures, 1);
    assert_eq!(report.nodes, 4);

    let failures = reporter.failures.lock();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("/missing"));
    assert!(failures[0].contains("404"));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let mut config = config(&mock_server.uri());
    config.crawler.request_timeout_ms = 200;
    let crawler = Crawler::new(config)
        .unwrap()
        .with_reporter(Arc::new(CollectingReporter::default()));

    let report = tokio::time::timeout(LIMIT, crawler.crawl())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.stats.failures, 1);
    assert_eq!(report.stats.completed, 0);
}
