//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `VisitedGraph`: URLs seen so far plus the links between them (the dedup cache)
//! - `UrlState` / `StateTable`: where each URL is in the fetch/parse pipeline
//! - `WorkTracker`: outstanding-work counter and crawl-wide cancellation

mod graph;
mod url_state;
mod work;

// Re-export main types
pub use graph::{Node, VisitedGraph};
pub use url_state::{StateTable, UrlState};
pub use work::WorkTracker;
