//! Visited graph used as the crawl's dedup cache
//!
//! Nodes are URLs that have been seen (queued or visited); edges record which
//! page linked to which URL. Pages routinely link back to pages already
//! visited, so the graph is a flat node map plus an adjacency list and is
//! never walked: membership is a single hash lookup.

use crate::GraphError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// A visited or queued URL
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Node {
    url: Arc<str>,
}

impl Node {
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Default)]
struct GraphInner {
    /// URL -> index into `nodes` / `edges`
    index: HashMap<Arc<str>, usize>,
    nodes: Vec<Node>,
    /// Outgoing edges per node, in insertion order
    edges: Vec<Vec<usize>>,
    edge_count: usize,
}

/// Thread-safe set of URLs plus their link relationships
///
/// Reads take a shared lock and may run concurrently with each other;
/// writes take the lock exclusively.
#[derive(Debug, Default)]
pub struct VisitedGraph {
    inner: RwLock<GraphInner>,
}

impl VisitedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `url` was previously added
    pub fn has_node(&self, url: &str) -> bool {
        self.inner.read().index.contains_key(url)
    }

    /// Adds a node for `url`
    ///
    /// Adding an existing URL is a no-op.
    ///
    /// # Returns
    ///
    /// `true` if a node was created, `false` if the URL was already present
    pub fn add_node(&self, url: &str) -> bool {
        let mut inner = self.inner.write();
        if inner.index.contains_key(url) {
            return false;
        }

        let key: Arc<str> = Arc::from(url);
        let id = inner.nodes.len();
        inner.nodes.push(Node { url: key.clone() });
        inner.edges.push(Vec::new());
        inner.index.insert(key, id);
        true
    }

    /// Records a directed edge `from -> to`
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeNotFound`] if either endpoint was never added
    pub fn add_edge(&self, from: &str, to: &str) -> Result<(), GraphError> {
        let mut inner = self.inner.write();

        let from_id = *inner
            .index
            .get(from)
            .ok_or_else(|| GraphError::NodeNotFound(from.to_string()))?;
        let to_id = *inner
            .index
            .get(to)
            .ok_or_else(|| GraphError::NodeNotFound(to.to_string()))?;

        inner.edges[from_id].push(to_id);
        inner.edge_count += 1;
        Ok(())
    }

    /// Returns true if an edge `from -> to` has been recorded
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        let inner = self.inner.read();
        match (inner.index.get(from), inner.index.get(to)) {
            (Some(&from_id), Some(&to_id)) => inner.edges[from_id].contains(&to_id),
            _ => false,
        }
    }

    /// Returns the targets of every edge leaving `url`, in insertion order
    pub fn neighbors(&self, url: &str) -> Option<Vec<String>> {
        let inner = self.inner.read();
        let id = *inner.index.get(url)?;
        Some(
            inner.edges[id]
                .iter()
                .map(|&target| inner.nodes[target].url().to_string())
                .collect(),
        )
    }

    /// Returns a copy of every node, in insertion order
    pub fn nodes(&self) -> Vec<Node> {
        self.inner.read().nodes.clone()
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.read().edge_count
    }
}
