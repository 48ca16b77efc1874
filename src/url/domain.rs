use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host (which shouldn't happen for valid HTTP(S) URLs), it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use crwl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if `link` lives on the same host (and port) as `root`
///
/// Subdomains are different hosts: `blog.example.com` is not internal to
/// `example.com`.
pub fn is_same_domain(root: &Url, link: &Url) -> bool {
    match (extract_domain(root), extract_domain(link)) {
        (Some(a), Some(b)) => a == b && root.port_or_known_default() == link.port_or_known_default(),
        _ => false,
    }
}
