//! Page types flowing through the crawl pipeline
//!
//! A [`RawPage`] is produced by a fetch worker and consumed by the parse
//! stage; a [`Page`] is produced by the parse stage and consumed by the
//! coordinator. Both are moved through channels and never shared.

use std::collections::HashSet;

/// Fetched bytes for a URL, not yet parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// The URL that was fetched (the graph key)
    pub url: String,

    /// Raw response body
    pub body: Vec<u8>,
}

impl RawPage {
    pub fn new(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            url: url.into(),
            body,
        }
    }
}

/// A parsed page and the links discovered on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    root_url: String,
    url: String,
    all_links: Vec<String>,
    internal_links: Vec<String>,
}

impl Page {
    /// Creates a page from its link lists
    ///
    /// Both lists are deduplicated in first-seen order, so callers may pass
    /// links exactly as they were encountered in the document.
    pub fn new(
        root_url: impl Into<String>,
        url: impl Into<String>,
        all_links: impl IntoIterator<Item = String>,
        internal_links: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            root_url: root_url.into(),
            url: url.into(),
            all_links: LinkSet::from_iter(all_links).into_vec(),
            internal_links: LinkSet::from_iter(internal_links).into_vec(),
        }
    }

    /// The crawl root this page was parsed against
    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// The URL of this page
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Every link found on the page, internal and external
    pub fn all_links(&self) -> &[String] {
        &self.all_links
    }

    /// Links on the same domain as the crawl root
    pub fn internal_links(&self) -> &[String] {
        &self.internal_links
    }
}

/// Insertion-ordered set of link URLs
#[derive(Debug, Default, Clone)]
pub struct LinkSet {
    seen: HashSet<String>,
    links: Vec<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link, returning false if it was already present
    pub fn insert(&mut self, link: String) -> bool {
        if self.seen.contains(&link) {
            return false;
        }
        self.seen.insert(link.clone());
        self.links.push(link);
        true
    }

    pub fn contains(&self, link: &str) -> bool {
        self.seen.contains(link)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.links
    }
}

impl FromIterator<String> for LinkSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = LinkSet::new();
        for link in iter {
            set.insert(link);
        }
        set
    }
}
