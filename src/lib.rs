//! crwl: a concurrent same-domain web crawler
//!
//! This crate crawls a site from a seed URL, visiting every page reachable
//! through internal links exactly once, and reports per-page links and
//! progress statistics.

pub mod config;
pub mod crawler;
pub mod output;
pub mod page;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crwl operations
#[derive(Debug, Error)]
pub enum CrwlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition for {url}: {from} -> {to}")]
    InvalidTransition {
        url: String,
        from: state::UrlState,
        to: state::UrlState,
    },

    #[error("Unknown URL in state table: {0}")]
    UnknownUrl(String),

    #[error("Crawl has already been started on this crawler")]
    AlreadyStarted,
}

impl CrwlError {
    /// Returns the URL a per-URL pipeline failure belongs to, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Fetch(e) => Some(e.url()),
            Self::Parse(e) => Some(e.url()),
            Self::InvalidTransition { url, .. } | Self::UnknownUrl(url) => Some(url),
            _ => None,
        }
    }
}

/// Failure to fetch the bytes behind a URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch {url}: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("failed to fetch {url}: request timed out")]
    Timeout { url: String },

    #[error("failed to fetch {url}: request failed with http {status}")]
    Status { url: String, status: u16 },

    #[error("failed to fetch {url}: {message}")]
    Other { url: String, message: String },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Request { url, .. }
            | Self::Timeout { url }
            | Self::Status { url, .. }
            | Self::Other { url, .. } => url,
        }
    }
}

/// Failure to turn a fetched body into a page
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse {url}: {message}")]
    Malformed { url: String, message: String },

    #[error("failed to parse {url}: {source}")]
    InvalidUrl { url: String, source: UrlError },
}

impl ParseError {
    /// The page URL whose parse failed
    pub fn url(&self) -> &str {
        match self {
            Self::Malformed { url, .. } | Self::InvalidUrl { url, .. } => url,
        }
    }
}

/// Visited graph errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("failed to add edge, no node found for {0}")]
    NodeNotFound(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for crwl operations
pub type Result<T> = std::result::Result<T, CrwlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlReport, CrawlStatus, Crawler};
pub use output::{Stats, StatsSnapshot};
pub use page::{Page, RawPage};
pub use state::{UrlState, VisitedGraph, WorkTracker};
