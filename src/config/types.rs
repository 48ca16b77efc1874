use serde::Deserialize;
use std::time::Duration;

/// Default seed URL crawled when none is configured
pub const DEFAULT_SEED_URL: &str = "https://example.com";

/// Default number of concurrent fetch workers
pub const DEFAULT_WORKERS: usize = 20;

/// Default per-request timeout in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default capacity of the bounded work queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Main configuration structure for crwl
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// URL the crawl starts from
    pub seed_url: String,

    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Timeout for a single page fetch (milliseconds)
    pub request_timeout_ms: u64,

    /// Maximum number of URLs waiting on the work queue
    pub queue_capacity: usize,

    /// Stop the whole crawl if the seed URL itself fails
    pub abort_on_seed_failure: bool,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: DEFAULT_SEED_URL.to_string(),
            workers: DEFAULT_WORKERS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            abort_on_seed_failure: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,

    /// URL with information about the crawler
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// Format: `CrawlerName/Version (+ContactURL)`, without the parenthesized
    /// part when no contact URL is configured.
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}
