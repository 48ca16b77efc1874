//! Configuration module for crwl
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Command-line flags are applied on top of the loaded values by the
//! binary.
//!
//! # Example
//!
//! ```no_run
//! use crwl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crwl.toml")).unwrap();
//! println!("Crawling {} with {} workers", config.crawler.seed_url, config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, UserAgentConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_REQUEST_TIMEOUT_MS,
    DEFAULT_SEED_URL, DEFAULT_WORKERS,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, parse_duration,
};
pub use validation::{validate, MAX_WORKERS};
