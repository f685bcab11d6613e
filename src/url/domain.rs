use url::Url;

/// Extracts the domain from a URL
///
/// Returns the lowercase host, or `None` if the URL has no host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_scribe::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if two URLs share the same authority (host and port)
///
/// This is the same-domain filter: a discovered link is only followed when
/// its authority matches the base URL's. Default ports are treated as equal
/// to their explicit form, so `http://ex.com` matches `http://ex.com:80`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_scribe::url::same_authority;
///
/// let base = Url::parse("http://ex.com/").unwrap();
/// assert!(same_authority(&base, &Url::parse("http://ex.com/b").unwrap()));
/// assert!(!same_authority(&base, &Url::parse("http://other.com/c").unwrap()));
/// ```
pub fn same_authority(base: &Url, candidate: &Url) -> bool {
    match (extract_domain(base), extract_domain(candidate)) {
        (Some(a), Some(b)) => {
            a == b && base.port_or_known_default() == candidate.port_or_known_default()
        }
        _ => false,
    }
}
