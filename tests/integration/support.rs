//! Canned fetchers and a collecting reporter for crawl tests

use async_trait::async_trait;
use crwl::config::Config;
use crwl::crawler::Fetcher;
use crwl::output::Reporter;
use crwl::{CrwlError, FetchError, Page};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Fetcher serving bodies from an in-memory site map
///
/// URLs missing from the map fail with a fetch error. Every call is counted
/// per URL.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, Vec<u8>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.as_bytes().to_vec());
        self
    }

    pub fn raw(mut self, url: &str, body: Vec<u8>) -> Self {
        self.pages.insert(url.to_string(), body);
        self
    }

    /// Shared handle to the per-URL call counts
    pub fn calls(&self) -> Arc<Mutex<HashMap<String, usize>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        *self.calls.lock().entry(url.to_string()).or_insert(0) += 1;

        // Let other workers interleave
        tokio::task::yield_now().await;

        self.pages.get(url).cloned().ok_or_else(|| FetchError::Other {
            url: url.to_string(),
            message: format!("{} not found in mock cache", url),
        })
    }
}

/// Fetcher whose requests never finish
pub struct HangingFetcher;

#[async_trait]
impl Fetcher for HangingFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        std::future::pending().await
    }
}

/// Reporter that keeps every page and failure it is handed
#[derive(Default)]
pub struct CollectingReporter {
    pub pages: Mutex<Vec<String>>,
    pub failures: Mutex<Vec<String>>,
}

impl Reporter for CollectingReporter {
    fn page(&self, page: &Page) {
        self.pages.lock().push(page.url().to_string());
    }

    fn failure(&self, error: &CrwlError) {
        self.failures.lock().push(error.to_string());
    }
}

/// Default configuration crawling `seed`
pub fn config(seed: &str) -> Config {
    let mut config = Config::default();
    config.crawler.seed_url = seed.to_string();
    config.crawler.workers = 4;
    config
}

/// Builds an HTML page linking to each href
pub fn html(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!("<a href=\"{}\">link</a>\n", href))
        .collect();
    format!("<html><body>\n{}</body></html>", anchors)
}
