//! HTML parser for extracting links
//!
//! This module turns a fetched body into a [`Page`]: every `<a href>` is
//! normalized against the crawl root, deduplicated and split into all links
//! and internal (same-domain) links.

use crate::page::{LinkSet, Page};
use crate::url::{is_same_domain, normalize_link, parse_http_url};
use crate::ParseError;
use scraper::{Html, Selector};
use url::Url;

/// Capability to turn a fetched body into a [`Page`]
///
/// Parsing is CPU-bound and runs on the blocking pool, so implementations
/// are synchronous.
pub trait PageParser: Send + Sync {
    fn parse(&self, root: &str, page_url: &str, body: &[u8]) -> Result<Page, ParseError>;
}

/// [`PageParser`] backed by `scraper`
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }
}

impl PageParser for HtmlParser {
    /// Parses an HTML body into a page
    ///
    /// # Link Extraction Rules
    ///
    /// **Include:**
    /// - `<a href="...">` anywhere in the document
    ///
    /// **Exclude:**
    /// - `javascript:`, `mailto:`, `tel:` links
    /// - Data URIs
    /// - Fragment-only anchors
    /// - Non-HTTP(S) URLs after resolution
    ///
    /// # Errors
    ///
    /// * `ParseError::Malformed` - The body is not valid UTF-8
    /// * `ParseError::InvalidUrl` - The root or page URL is not an absolute HTTP(S) URL
    fn parse(&self, root: &str, page_url: &str, body: &[u8]) -> Result<Page, ParseError> {
        let root_url = parse_http_url(root).map_err(|source| ParseError::InvalidUrl {
            url: page_url.to_string(),
            source,
        })?;
        parse_http_url(page_url).map_err(|source| ParseError::InvalidUrl {
            url: page_url.to_string(),
            source,
        })?;

        let html = std::str::from_utf8(body).map_err(|e| ParseError::Malformed {
            url: page_url.to_string(),
            message: format!("body is not valid UTF-8: {}", e),
        })?;

        let document = Html::parse_document(html);
        let (all_links, internal_links) = extract_links(&document, &root_url);

        Ok(Page::new(root, page_url, all_links, internal_links))
    }
}

/// Extracts all valid links, returning (all, internal)
fn extract_links(document: &Html, root: &Url) -> (Vec<String>, Vec<String>) {
    let mut all = LinkSet::new();
    let mut internal = LinkSet::new();

    let Ok(selector) = Selector::parse("a[href]") else {
        return (Vec::new(), Vec::new());
    };

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(link) = normalize_link(root, href) else {
            continue;
        };

        // normalize_link only returns strings that came from a parsed Url
        let is_internal = Url::parse(&link)
            .map(|parsed| is_same_domain(root, &parsed))
            .unwrap_or(false);

        if is_internal {
            internal.insert(link.clone());
        }
        all.insert(link);
    }

    (all.into_vec(), internal.into_vec())
}
