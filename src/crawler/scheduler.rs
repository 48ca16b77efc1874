//! Work queue, fetch worker pool and parse stage
//!
//! This module handles:
//! - The bounded FIFO queue the coordinator fills and the workers drain
//! - A fixed pool of fetch workers sharing that queue
//! - The parse stage, which runs one blocking parse task per fetched page
//!
//! Every task here selects on the crawl's cancellation token, so a crawl can
//! be stopped while workers are waiting on the queue, on a fetch or on a
//! full downstream channel.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::PageParser;
use crate::page::{Page, RawPage};
use crate::state::{StateTable, UrlState};
use crate::{CrwlError, ParseError};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

/// Receiving half of the work queue, shared by every fetch worker
pub type SharedReceiver = Arc<Mutex<mpsc::Receiver<String>>>;

/// Creates the bounded work queue
///
/// Sends wait for a free slot once `capacity` URLs are queued.
pub fn work_queue(capacity: usize) -> (mpsc::Sender<String>, SharedReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (tx, Arc::new(Mutex::new(rx)))
}

/// Sends `value`, giving up if the crawl is cancelled first
///
/// Returns false if the value was not delivered.
pub(crate) async fn send_or_cancel<T>(
    tx: &mpsc::Sender<T>,
    value: T,
    cancel: &CancellationToken,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = tx.send(value) => sent.is_ok(),
    }
}

/// Channels and shared state handed to each fetch worker
#[derive(Clone)]
pub struct WorkerContext {
    pub queue: SharedReceiver,
    pub fetcher: Arc<dyn Fetcher>,
    pub states: Arc<StateTable>,
    pub pages: mpsc::Sender<RawPage>,
    pub errors: mpsc::Sender<CrwlError>,
    pub cancel: CancellationToken,
}

/// Starts `workers` fetch workers
///
/// Each worker repeatedly takes the next URL from the queue, fetches it and
/// forwards the body to the parse stage, or the failure to the error
/// handler. Workers never touch the visited graph.
pub fn spawn_fetch_workers(workers: usize, ctx: WorkerContext) -> Vec<JoinHandle<()>> {
    (0..workers)
        .map(|id| tokio::spawn(run_fetch_worker(id, ctx.clone())))
        .collect()
}

async fn run_fetch_worker(id: usize, ctx: WorkerContext) {
    tracing::trace!("Fetch worker {} started", id);

    loop {
        let next = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => None,
            url = async { ctx.queue.lock().await.recv().await } => url,
        };
        let Some(url) = next else {
            break;
        };

        if let Err(e) = ctx.states.advance(&url, UrlState::Fetching) {
            if !send_or_cancel(&ctx.errors, e, &ctx.cancel).await {
                break;
            }
            continue;
        }

        tracing::debug!("Fetching {}", url);
        let result = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => break,
            result = ctx.fetcher.fetch(&url) => result,
        };

        let delivered = match result {
            Ok(body) => match ctx.states.advance(&url, UrlState::Parsing) {
                Ok(_) => send_or_cancel(&ctx.pages, RawPage::new(url, body), &ctx.cancel).await,
                Err(e) => send_or_cancel(&ctx.errors, e, &ctx.cancel).await,
            },
            Err(e) => send_or_cancel(&ctx.errors, e.into(), &ctx.cancel).await,
        };

        if !delivered {
            break;
        }
    }

    tracing::trace!("Fetch worker {} stopped", id);
}

/// Starts the parse stage
///
/// Every raw page is parsed in its own task on the blocking pool. A parser
/// that panics is reported as a [`ParseError`] for that page.
pub fn spawn_parse_stage(
    mut raw_pages: mpsc::Receiver<RawPage>,
    parser: Arc<dyn PageParser>,
    root: Arc<str>,
    pages: mpsc::Sender<Page>,
    errors: mpsc::Sender<CrwlError>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        tracing::warn!("Parse task failed: {}", e);
                    }
                }
                raw = raw_pages.recv() => {
                    let Some(raw) = raw else {
                        break;
                    };
                    tasks.spawn(parse_page(
                        raw,
                        parser.clone(),
                        root.clone(),
                        pages.clone(),
                        errors.clone(),
                        cancel.clone(),
                    ));
                }
            }
        }

        tasks.shutdown().await;
    })
}

async fn parse_page(
    raw: RawPage,
    parser: Arc<dyn PageParser>,
    root: Arc<str>,
    pages: mpsc::Sender<Page>,
    errors: mpsc::Sender<CrwlError>,
    cancel: CancellationToken,
) {
    let url = raw.url.clone();
    let joined =
        tokio::task::spawn_blocking(move || parser.parse(&root, &raw.url, &raw.body)).await;

    let outcome = match joined {
        Ok(parsed) => parsed.map_err(CrwlError::from),
        Err(e) => Err(ParseError::Malformed {
            url,
            message: format!("parser task failed: {}", e),
        }
        .into()),
    };

    match outcome {
        Ok(page) => {
            send_or_cancel(&pages, page, &cancel).await;
        }
        Err(e) => {
            send_or_cancel(&errors, e, &cancel).await;
        }
    }
}
