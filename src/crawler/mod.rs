//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through the [`Fetcher`] capability
//! - HTML parsing and link extraction through the [`PageParser`] capability
//! - The fetch worker pool and parse stage
//! - Overall crawl coordination and completion detection

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use parser::{HtmlParser, PageParser};
pub use scheduler::{spawn_fetch_workers, spawn_parse_stage, work_queue, SharedReceiver, WorkerContext};

use crate::config::{validate, Config, CrawlerConfig};
use crate::output::{Reporter, Stats, StatsSnapshot, TracingReporter};
use crate::state::{StateTable, VisitedGraph, WorkTracker};
use crate::url::normalize_seed;
use crate::{CrwlError, Result};
use coordinator::{spawn_error_handler, CrawlContext, Coordinator};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// How a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlStatus {
    /// Outstanding work reached zero
    Completed,

    /// The cancellation token was triggered
    Cancelled,

    /// The crawl stopped itself, e.g. because the seed failed
    Aborted,
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Aborted => "aborted",
        };
        write!(f, "{}", s)
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub status: CrawlStatus,
    pub stats: StatsSnapshot,
    pub nodes: usize,
    pub edges: usize,
    pub abort_reason: Option<String>,
}

/// A single crawl run over one site
///
/// The graph, statistics and state table are owned by the crawler and remain
/// readable after [`Crawler::crawl`] returns.
pub struct Crawler {
    seed: String,
    config: CrawlerConfig,
    fetcher: Arc<dyn Fetcher>,
    parser: Arc<dyn PageParser>,
    reporter: Arc<dyn Reporter>,
    graph: Arc<VisitedGraph>,
    stats: Arc<Stats>,
    states: Arc<StateTable>,
    tracker: Arc<WorkTracker>,
    started: AtomicBool,
}

impl Crawler {
    /// Creates a crawler using the HTTP fetcher, HTML parser and tracing
    /// reporter
    ///
    /// # Errors
    ///
    /// * `CrwlError::Config` - The configuration is invalid
    /// * `CrwlError::Reqwest` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        validate(&config)?;

        let fetcher = HttpFetcher::new(&config.user_agent, config.crawler.request_timeout())?;

        Ok(Self {
            seed: normalize_seed(&config.crawler.seed_url),
            config: config.crawler,
            fetcher: Arc::new(fetcher),
            parser: Arc::new(HtmlParser::new()),
            reporter: Arc::new(TracingReporter),
            graph: Arc::new(VisitedGraph::new()),
            stats: Arc::new(Stats::new()),
            states: Arc::new(StateTable::new()),
            tracker: Arc::new(WorkTracker::new()),
            started: AtomicBool::new(false),
        })
    }

    /// Replaces the fetch capability
    pub fn with_fetcher(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetcher = Arc::new(fetcher);
        self
    }

    /// Replaces the parse capability
    pub fn with_parser(mut self, parser: impl PageParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Replaces the reporter
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// The normalized seed URL
    pub fn seed_url(&self) -> &str {
        &self.seed
    }

    pub fn graph(&self) -> &VisitedGraph {
        &self.graph
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn states(&self) -> &StateTable {
        &self.states
    }

    /// Token that stops the crawl when cancelled
    pub fn cancel_token(&self) -> CancellationToken {
        self.tracker.cancel_token()
    }

    /// Crawls the site from the seed URL
    ///
    /// Returns once every discovered URL has been fetched and processed or
    /// has failed, or once the crawl is cancelled. Per-URL failures are
    /// reported and counted; they never fail the crawl.
    ///
    /// # Errors
    ///
    /// * `CrwlError::AlreadyStarted` - This crawler has already run
    pub async fn crawl(&self) -> Result<CrawlReport> {
        if self.started.swap(true, Ordering::AcqRel) {
            return Err(CrwlError::AlreadyStarted);
        }

        let capacity = self.config.queue_capacity;
        let cancel = self.tracker.cancel_token();

        let (work_tx, work_rx) = work_queue(capacity);
        let (raw_tx, raw_rx) = mpsc::channel(capacity);
        let (page_tx, page_rx) = mpsc::channel(capacity);
        let (err_tx, err_rx) = mpsc::channel(capacity);

        let ctx = Arc::new(CrawlContext {
            seed: self.seed.clone(),
            graph: self.graph.clone(),
            stats: self.stats.clone(),
            states: self.states.clone(),
            tracker: self.tracker.clone(),
            reporter: self.reporter.clone(),
            abort_on_seed_failure: self.config.abort_on_seed_failure,
        });

        tracing::info!(
            "Starting crawl of {} with {} workers",
            self.seed,
            self.config.workers
        );
        self.stats.record_start_time();

        // Seed the graph; from here on the coordinator is the only inserter
        self.graph.add_node(&self.seed);
        self.states.insert_discovered(&self.seed);
        self.stats.record_new_operation();
        self.tracker.add(1);

        let mut coordinator = Coordinator::new(ctx.clone(), work_tx);
        coordinator.enqueue(self.seed.clone());

        let mut handles = spawn_fetch_workers(
            self.config.workers,
            WorkerContext {
                queue: work_rx,
                fetcher: self.fetcher.clone(),
                states: self.states.clone(),
                pages: raw_tx,
                errors: err_tx.clone(),
                cancel: cancel.clone(),
            },
        );
        handles.push(spawn_parse_stage(
            raw_rx,
            self.parser.clone(),
            Arc::from(self.seed.as_str()),
            page_tx,
            err_tx,
            cancel.clone(),
        ));
        handles.push(tokio::spawn(coordinator.run(page_rx)));
        handles.push(spawn_error_handler(err_rx, ctx));

        let finished = tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = self.tracker.wait_idle() => true,
        };

        self.stats.record_total_duration();
        self.tracker.cancel();
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Crawl task failed: {}", e);
            }
        }

        let abort_reason = self.tracker.abort_reason().map(str::to_string);
        let status = match (finished, &abort_reason) {
            (true, _) => CrawlStatus::Completed,
            (false, Some(_)) => CrawlStatus::Aborted,
            (false, None) => CrawlStatus::Cancelled,
        };

        let report = CrawlReport {
            status,
            stats: self.stats.snapshot(),
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            abort_reason,
        };

        tracing::info!(
            "Crawl {}: {} URLs, {} links",
            report.status,
            report.nodes,
            report.edges
        );

        Ok(report)
    }
}
