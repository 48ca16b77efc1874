//! Crawl progress statistics
//!
//! Counters are plain atomics so any pipeline stage can record progress
//! without locking. The start time and total duration are each written at
//! most once; later writes are ignored.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Thread-safe crawl counters
#[derive(Debug, Default)]
pub struct Stats {
    /// Every URL the crawler has taken on
    total: AtomicU64,

    /// URLs taken on but not yet completed or failed
    pending: AtomicI64,

    /// URLs fetched, parsed and processed
    completed: AtomicU64,

    /// URLs that failed somewhere in the pipeline
    failures: AtomicU64,

    started: OnceLock<Instant>,
    started_at: OnceLock<DateTime<Utc>>,
    duration: OnceLock<Duration>,
}

/// Point-in-time copy of [`Stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub total: u64,
    pub pending: i64,
    pub completed: u64,
    pub failures: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
}

impl StatsSnapshot {
    /// True when every URL taken on has been resolved
    pub fn is_balanced(&self) -> bool {
        self.pending == 0 && self.total == self.completed + self.failures
    }
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly discovered URL entering the pipeline
    pub fn record_new_operation(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
        self.total.fetch_add(1, Ordering::AcqRel);
    }

    /// Records a URL whose page was fully processed
    pub fn record_operation_completion(&self) {
        self.pending.fetch_sub(1, Ordering::AcqRel);
        self.completed.fetch_add(1, Ordering::AcqRel);
    }

    /// Records a URL that failed to fetch or parse
    pub fn record_operation_failure(&self) {
        self.pending.fetch_sub(1, Ordering::AcqRel);
        self.failures.fetch_add(1, Ordering::AcqRel);
    }

    /// Records the crawl start time; only the first call has any effect
    pub fn record_start_time(&self) {
        if self.started.set(Instant::now()).is_ok() {
            let _ = self.started_at.set(Utc::now());
        }
    }

    /// Records the elapsed time since the start
    ///
    /// Ignored if no start time was recorded or a duration already exists.
    pub fn record_total_duration(&self) {
        if let Some(started) = self.started.get() {
            let _ = self.duration.set(started.elapsed());
        }
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    pub fn pending(&self) -> i64 {
        self.pending.load(Ordering::Acquire)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Acquire)
    }

    /// Wall-clock time the crawl started, if it has
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at.get().copied()
    }

    /// Time since the crawl started, or the final duration once recorded
    pub fn elapsed(&self) -> Duration {
        match (self.duration.get(), self.started.get()) {
            (Some(duration), _) => *duration,
            (None, Some(started)) => started.elapsed(),
            (None, None) => Duration::ZERO,
        }
    }

    pub fn duration(&self) -> Option<Duration> {
        self.duration.get().copied()
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total(),
            pending: self.pending(),
            completed: self.completed(),
            failures: self.failures(),
            started_at: self.started_at(),
            duration: self.duration(),
        }
    }
}

/// One-line counter summary
pub fn summary_line(stats: &StatsSnapshot) -> String {
    format!(
        "Total: {}. Pending: {}. Completed: {}. Failed: {}",
        stats.total, stats.pending, stats.completed, stats.failures
    )
}

/// Closing line naming how many URLs were processed and how long it took
pub fn finished_line(stats: &StatsSnapshot) -> String {
    format!(
        "Finished crawling {} URLs in {:.2?}",
        stats.total,
        stats.duration.unwrap_or_default()
    )
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &StatsSnapshot) {
    println!("=== Crawl Statistics ===\n");

    if let Some(started_at) = stats.started_at {
        println!("Started: {}", started_at.to_rfc3339());
    }
    println!("{}", summary_line(stats));

    let success_rate = if stats.total > 0 {
        (stats.completed as f64 / stats.total as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        success_rate, stats.completed, stats.total
    );
    println!();
    println!("{}", finished_line(stats));
}
