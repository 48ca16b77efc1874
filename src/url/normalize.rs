use url::Url;

/// Schemes and prefixes that never lead to a crawlable page
const SKIPPED_PREFIXES: &[&str] = &["javascript:", "mailto:", "tel:", "data:", "#"];

/// Normalizes a seed URL into the same form discovered links take
///
/// The seed is the graph key of the root page and must compare equal to
/// links that point back at it. A seed that is not an HTTP(S) URL is only
/// trimmed, so its fetch fails and is reported like any other URL.
///
/// # Examples
///
/// ```
/// use crwl::url::normalize_seed;
///
/// assert_eq!(normalize_seed("https://example.com/"), "https://example.com");
/// assert_eq!(normalize_seed("https://Example.com:443/docs"), "https://example.com/docs");
/// assert_eq!(normalize_seed("not a url/"), "not a url");
/// ```
pub fn normalize_seed(seed: &str) -> String {
    let seed = seed.trim();

    match Url::parse(seed) {
        Ok(url) if is_http(&url) => canonical(url),
        _ => strip_trailing_slash(seed).to_string(),
    }
}

/// Resolves an href found on a page into a normalized absolute URL
///
/// # Normalization Steps
///
/// 1. Skip empty hrefs, fragment-only anchors and `javascript:`, `mailto:`,
///    `tel:`, `data:` links
/// 2. Resolve relative links against the crawl root
/// 3. Reject anything that is not HTTP(S) after resolution
/// 4. Remove the fragment and an empty query
/// 5. Remove the trailing slash
///
/// # Arguments
///
/// * `root` - The crawl root URL
/// * `href` - The raw `href` attribute value
///
/// # Returns
///
/// * `Some(String)` - The normalized absolute URL
/// * `None` - The link should be ignored
///
/// # Examples
///
/// ```
/// use crwl::url::normalize_link;
/// use url::Url;
///
/// let root = Url::parse("https://example.com").unwrap();
/// assert_eq!(
///     normalize_link(&root, "/cards"),
///     Some("https://example.com/cards".to_string())
/// );
/// assert_eq!(
///     normalize_link(&root, "https://example.com/help/"),
///     Some("https://example.com/help".to_string())
/// );
/// assert_eq!(normalize_link(&root, "mailto:hi@example.com"), None);
/// ```
pub fn normalize_link(root: &Url, href: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
    {
        return None;
    }

    let resolved = root.join(href).ok()?;
    if !is_http(&resolved) {
        return None;
    }

    Some(canonical(resolved))
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Serializes a URL without fragment, empty query or trailing slash
fn canonical(mut url: Url) -> String {
    url.set_fragment(None);
    if url.query() == Some("") {
        url.set_query(None);
    }

    strip_trailing_slash(url.as_str()).to_string()
}

fn strip_trailing_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}
