//! Crawler coordinator - dedup decisions and dispatch
//!
//! The coordinator is the single owner of node insertion after the seed. It
//! processes completed pages one at a time in arrival order, adds every new
//! internal link to the visited graph and its frontier, and moves frontier
//! entries onto the bounded work queue as slots free up.
//!
//! Failures are resolved by a separate error-handler task so the coordinator
//! never waits on anything but its own page channel and the work queue.

use crate::output::{Reporter, Stats};
use crate::page::Page;
use crate::state::{StateTable, UrlState, VisitedGraph, WorkTracker};
use crate::CrwlError;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Pages between progress log lines
const PROGRESS_INTERVAL: u64 = 10;

/// State shared by the coordinator and the error handler
pub(crate) struct CrawlContext {
    pub seed: String,
    pub graph: Arc<VisitedGraph>,
    pub stats: Arc<Stats>,
    pub states: Arc<StateTable>,
    pub tracker: Arc<WorkTracker>,
    pub reporter: Arc<dyn Reporter>,
    pub abort_on_seed_failure: bool,
}

/// Main coordinator structure
pub(crate) struct Coordinator {
    ctx: Arc<CrawlContext>,
    work_tx: mpsc::Sender<String>,

    /// Discovered URLs waiting for a work queue slot
    frontier: VecDeque<String>,

    pages_processed: u64,
    started: Instant,
}

impl Coordinator {
    pub fn new(ctx: Arc<CrawlContext>, work_tx: mpsc::Sender<String>) -> Self {
        Self {
            ctx,
            work_tx,
            frontier: VecDeque::new(),
            pages_processed: 0,
            started: Instant::now(),
        }
    }

    /// Queues an already-registered URL for dispatch
    pub fn enqueue(&mut self, url: String) {
        self.frontier.push_back(url);
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Runs the coordinator loop until the crawl is cancelled or the page
    /// channel closes
    ///
    /// Each iteration either reserves a work queue slot for the frontier head
    /// or takes the next completed page, whichever is ready first.
    pub async fn run(mut self, mut pages: mpsc::Receiver<Page>) {
        let cancel = self.ctx.tracker.cancel_token();
        let work_tx = self.work_tx.clone();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                permit = work_tx.reserve(), if !self.frontier.is_empty() => match permit {
                    Ok(permit) => {
                        if let Some(url) = self.next_dispatch() {
                            permit.send(url);
                        }
                    }
                    Err(_) => {
                        tracing::debug!("Work queue closed, stopping coordinator");
                        break;
                    }
                },
                page = pages.recv() => match page {
                    Some(page) => self.process_page(page),
                    None => break,
                },
            }
        }

        tracing::debug!(
            "Coordinator stopped after {} pages, {} URLs left in frontier",
            self.pages_processed,
            self.frontier_size()
        );
    }

    /// Pops the next frontier URL and marks it dispatched
    ///
    /// A URL whose state cannot advance is resolved as a failure instead.
    fn next_dispatch(&mut self) -> Option<String> {
        while let Some(url) = self.frontier.pop_front() {
            match self.ctx.states.advance(&url, UrlState::Dispatched) {
                Ok(_) => return Some(url),
                Err(e) => resolve_failure(&self.ctx, e),
            }
        }
        None
    }

    /// Records a completed page's links and resolves its unit of work
    pub fn process_page(&mut self, page: Page) {
        let ctx = &self.ctx;
        let from = page.url();

        for link in page.internal_links() {
            let is_new = ctx.graph.add_node(link);
            if let Err(e) = ctx.graph.add_edge(from, link) {
                tracing::warn!("{}", e);
            }
            if !is_new {
                continue;
            }

            ctx.states.insert_discovered(link);
            ctx.stats.record_new_operation();
            ctx.tracker.add(1);
            self.frontier.push_back(link.clone());
        }

        if let Err(e) = ctx.states.advance(from, UrlState::Completed) {
            tracing::error!("{}", e);
        }
        ctx.stats.record_operation_completion();
        ctx.reporter.page(&page);
        ctx.tracker.complete();

        self.pages_processed += 1;
        if self.pages_processed % PROGRESS_INTERVAL == 0 {
            let elapsed = self.started.elapsed();
            let rate = self.pages_processed as f64 / elapsed.as_secs_f64();
            tracing::info!(
                "Progress: {} pages crawled, {} in frontier, {:.2} pages/sec",
                self.pages_processed,
                self.frontier.len(),
                rate
            );
        }
    }
}

/// Starts the task that resolves per-URL failures
pub(crate) fn spawn_error_handler(
    mut errors: mpsc::Receiver<CrwlError>,
    ctx: Arc<CrawlContext>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let cancel = ctx.tracker.cancel_token();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                error = errors.recv() => match error {
                    Some(error) => resolve_failure(&ctx, error),
                    None => break,
                },
            }
        }
    })
}

/// Reports a failed URL, marks it failed and resolves its unit of work
pub(crate) fn resolve_failure(ctx: &CrawlContext, error: CrwlError) {
    ctx.reporter.failure(&error);

    if let Some(url) = error.url() {
        if let Some(target) = failure_state(ctx.states.get(url), &error) {
            if let Err(e) = ctx.states.advance(url, target) {
                tracing::error!("{}", e);
            }
        }

        if ctx.abort_on_seed_failure && url == ctx.seed {
            ctx.tracker.abort(format!("seed URL failed: {}", error));
        }
    }

    ctx.stats.record_operation_failure();
    ctx.tracker.complete();
}

fn failure_state(current: Option<UrlState>, error: &CrwlError) -> Option<UrlState> {
    match (error, current) {
        (CrwlError::Fetch(_), _) | (_, Some(UrlState::Fetching)) => Some(UrlState::FetchFailed),
        (CrwlError::Parse(_), _) | (_, Some(UrlState::Parsing)) => Some(UrlState::ParseFailed),
        _ => None,
    }
}
