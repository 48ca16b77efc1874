//! Per-page and per-failure reporting
//!
//! The coordinator hands every completed page to a [`Reporter`], and the
//! error handler hands it every per-URL failure. The default reporter writes
//! both through `tracing`.

use crate::page::Page;
use crate::CrwlError;
use std::fmt::Write;

/// Receives crawl results as they are produced
///
/// Implementations are called from the coordinator and error-handler tasks
/// and must not block for long.
pub trait Reporter: Send + Sync {
    /// Called once for every page whose links were processed
    fn page(&self, page: &Page);

    /// Called once for every URL that failed to fetch or parse
    fn failure(&self, error: &CrwlError);
}

/// Reporter that logs through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn page(&self, page: &Page) {
        tracing::info!("{}", format_page_report(page));
    }

    fn failure(&self, error: &CrwlError) {
        tracing::warn!("{}", error);
    }
}

/// Formats the link listing for a page
///
/// ```
/// use crwl::output::format_page_report;
/// use crwl::Page;
///
/// let page = Page::new(
///     "https://example.com",
///     "https://example.com",
///     vec!["https://example.com/a".to_string()],
///     vec!["https://example.com/a".to_string()],
/// );
/// assert_eq!(
///     format_page_report(&page),
///     "Extracted links in URL: https://example.com\n\thttps://example.com/a\n"
/// );
/// ```
pub fn format_page_report(page: &Page) -> String {
    let mut report = format!("Extracted links in URL: {}\n", page.url());
    for link in page.all_links() {
        let _ = writeln!(report, "\t{}", link);
    }
    report
}
