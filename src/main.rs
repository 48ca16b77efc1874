//! crwl main entry point
//!
//! This is the command-line interface for the crwl same-domain crawler.

use anyhow::{bail, Context};
use clap::Parser;
use crwl::config::{load_config_with_hash, parse_duration, Config};
use crwl::output::print_statistics;
use crwl::{CrawlStatus, Crawler};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// crwl: a concurrent same-domain web crawler
///
/// crwl starts at a seed URL and visits every page reachable through links
/// on the same host, printing the links found on each page and a summary of
/// the crawl.
///
/// Long flags take two dashes. The single-dash spellings `-url`, `-workers`,
/// `-timeout`, `-queue-capacity` and `-config` are accepted as well.
#[derive(Parser, Debug)]
#[command(name = "crwl")]
#[command(version)]
#[command(about = "A concurrent same-domain web crawler", long_about = None)]
struct Cli {
    /// URL to crawl [default: https://example.com]
    #[arg(long)]
    url: Option<String>,

    /// Maximum number of concurrent fetches [default: 20]
    #[arg(long)]
    workers: Option<usize>,

    /// Timeout for a single page fetch, e.g. 500ms, 30s, 2m [default: 30s]
    #[arg(long, value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Maximum number of URLs waiting for a worker [default: 1024]
    #[arg(long)]
    queue_capacity: Option<usize>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_from(expand_single_dash_flags(std::env::args()));

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    let crawler = Crawler::new(config).context("Failed to initialize crawler")?;

    // Stop the crawl on Ctrl+C
    let cancel = crawler.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Received Ctrl+C, stopping crawl");
            cancel.cancel();
        }
    });

    let report = crawler.crawl().await.context("Crawl failed")?;
    print_statistics(&report.stats);

    if report.status == CrawlStatus::Aborted {
        bail!(
            "Crawl aborted: {}",
            report.abort_reason.as_deref().unwrap_or("unknown reason")
        );
    }

    Ok(())
}

/// Long flags that may also be written with a single dash
const SINGLE_DASH_FLAGS: &[&str] = &["url", "workers", "timeout", "queue-capacity", "config"];

/// Rewrites `-url x` and `-url=x` into their `--url` forms
fn expand_single_dash_flags<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| {
            let long_name = arg
                .strip_prefix('-')
                .filter(|rest| !rest.starts_with('-'))
                .and_then(|rest| rest.split('=').next());
            let expand = matches!(long_name, Some(name) if SINGLE_DASH_FLAGS.contains(&name));

            if expand {
                format!("-{}", arg)
            } else {
                arg
            }
        })
        .collect()
}

/// Loads the optional config file and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(url) = &cli.url {
        config.crawler.seed_url = url.clone();
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
    }
    if let Some(capacity) = cli.queue_capacity {
        config.crawler.queue_capacity = capacity;
    }

    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crwl=info,warn"),
            1 => EnvFilter::new("crwl=debug,info"),
            2 => EnvFilter::new("crwl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
