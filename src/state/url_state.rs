/// Per-URL state definitions for tracking crawl progress
///
/// This module defines every state a URL can be in during a crawl and the
/// table that records each URL's current state.
use crate::{CrwlError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

/// Represents the current state of a URL in the crawl process
///
/// ```text
/// Discovered -> Dispatched -> Fetching -> FetchFailed
///                                     \-> Parsing -> ParseFailed
///                                                 \-> Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    // ===== Active States =====
    /// URL has been added to the graph and is waiting in the frontier
    Discovered,

    /// URL has been placed on the work queue
    Dispatched,

    /// A worker is fetching the URL
    Fetching,

    /// The body was fetched and is being parsed
    Parsing,

    // ===== Terminal States =====
    /// Page was fetched, parsed and its links processed
    Completed,

    /// The fetch failed (network error, timeout or non-success status)
    FetchFailed,

    /// The body could not be turned into a page
    ParseFailed,
}

impl UrlState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::FetchFailed | Self::ParseFailed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if this represents a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::FetchFailed | Self::ParseFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Dispatched => "dispatched",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Completed => "completed",
            Self::FetchFailed => "fetch_failed",
            Self::ParseFailed => "parse_failed",
        }
    }

    /// Returns true if a URL in this state may move to `next`
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        matches!(
            (self, next),
            (Self::Discovered, Self::Dispatched)
                | (Self::Dispatched, Self::Fetching)
                | (Self::Fetching, Self::Parsing)
                | (Self::Fetching, Self::FetchFailed)
                | (Self::Parsing, Self::Completed)
                | (Self::Parsing, Self::ParseFailed)
        )
    }

    /// Returns all possible URL states
    pub fn all_states() -> [Self; 7] {
        [
            Self::Discovered,
            Self::Dispatched,
            Self::Fetching,
            Self::Parsing,
            Self::Completed,
            Self::FetchFailed,
            Self::ParseFailed,
        ]
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Current state of every URL known to the crawl
#[derive(Debug, Default)]
pub struct StateTable {
    states: RwLock<HashMap<String, UrlState>>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url` as discovered
    ///
    /// Returns false (and changes nothing) if the URL is already tracked.
    pub fn insert_discovered(&self, url: &str) -> bool {
        let mut states = self.states.write();
        if states.contains_key(url) {
            return false;
        }
        states.insert(url.to_string(), UrlState::Discovered);
        true
    }

    /// Moves `url` to `to`, returning the previous state
    ///
    /// # Errors
    ///
    /// * [`CrwlError::UnknownUrl`] if the URL was never discovered
    /// * [`CrwlError::InvalidTransition`] if the move is not allowed
    pub fn advance(&self, url: &str, to: UrlState) -> Result<UrlState> {
        let mut states = self.states.write();
        let current = states
            .get_mut(url)
            .ok_or_else(|| CrwlError::UnknownUrl(url.to_string()))?;

        let from = *current;
        if !from.can_transition_to(to) {
            return Err(CrwlError::InvalidTransition {
                url: url.to_string(),
                from,
                to,
            });
        }

        *current = to;
        Ok(from)
    }

    pub fn get(&self, url: &str) -> Option<UrlState> {
        self.states.read().get(url).copied()
    }

    /// Number of URLs currently in `state`
    pub fn count(&self, state: UrlState) -> usize {
        self.states.read().values().filter(|s| **s == state).count()
    }

    pub fn len(&self) -> usize {
        self.states.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.read().is_empty()
    }

    /// Returns true if every tracked URL has reached a terminal state
    pub fn all_terminal(&self) -> bool {
        self.states.read().values().all(UrlState::is_terminal)
    }

    /// URLs that have not reached a terminal state
    pub fn unfinished(&self) -> Vec<(String, UrlState)> {
        self.states
            .read()
            .iter()
            .filter(|(_, s)| !s.is_terminal())
            .map(|(url, s)| (url.clone(), *s))
            .collect()
    }
}
