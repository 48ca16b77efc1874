//! Outstanding-work tracking and crawl-wide shutdown
//!
//! Every URL dispatched into the pipeline is one unit of outstanding work.
//! The unit is resolved exactly once: by the coordinator after a page's links
//! are processed, or by the error handler after a fetch or parse failure. The
//! crawl is finished when the count reaches zero.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

/// Counter of unresolved work plus the crawl's cancellation signal
#[derive(Debug, Default)]
pub struct WorkTracker {
    outstanding: AtomicUsize,
    idle: Notify,
    cancel: CancellationToken,
    abort_reason: OnceLock<String>,
}

impl WorkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `n` new units of outstanding work
    pub fn add(&self, n: usize) {
        self.outstanding.fetch_add(n, Ordering::AcqRel);
    }

    /// Resolves one unit of work, waking idle waiters when none remain
    pub fn complete(&self) {
        let prev = self
            .outstanding
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match prev {
            Ok(1) => self.idle.notify_waiters(),
            Ok(_) => {}
            Err(_) => tracing::warn!("Work completed with no outstanding work registered"),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::Acquire)
    }

    /// Waits until outstanding work reaches zero
    ///
    /// Returns immediately if nothing is outstanding.
    pub async fn wait_idle(&self) {
        loop {
            // Register interest before checking so a concurrent `complete`
            // between the check and the await is not missed.
            let notified = self.idle.notified();
            if self.outstanding() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// A clone of the crawl-wide cancellation token
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stops the crawl, recording `reason` if it is the first abort
    pub fn abort(&self, reason: impl Into<String>) {
        let reason = reason.into();
        if self.abort_reason.set(reason.clone()).is_ok() {
            tracing::error!("Aborting crawl: {}", reason);
        }
        self.cancel();
    }

    pub fn abort_reason(&self) -> Option<&str> {
        self.abort_reason.get().map(String::as_str)
    }
}
