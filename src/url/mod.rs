//! URL handling module for crwl
//!
//! This module provides seed and link normalization, domain extraction and
//! the same-domain check that decides which links are internal.

mod domain;
mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, is_same_domain};
pub use normalize::{normalize_link, normalize_seed};

/// Parses a string into an absolute HTTP(S) URL with a host
///
/// # Examples
///
/// ```
/// use crwl::url::parse_http_url;
///
/// assert!(parse_http_url("https://example.com").is_ok());
/// assert!(parse_http_url("ftp://example.com").is_err());
/// assert!(parse_http_url("not a url").is_err());
/// ```
pub fn parse_http_url(input: &str) -> UrlResult<Url> {
    let url = Url::parse(input).map_err(|e| UrlError::Parse(format!("{}: {}", input, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(input.to_string()));
    }

    Ok(url)
}
