//! Output module for crawl progress and results
//!
//! This module handles:
//! - Recording crawl statistics
//! - Reporting each processed page and each failed URL
//! - Printing the final summary

mod report;
pub mod stats;

pub use report::{format_page_report, Reporter, TracingReporter};
pub use stats::{finished_line, print_statistics, summary_line, Stats, StatsSnapshot};
