/// Href prefixes that hand off to another application instead of a page
const SKIPPED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:"];

/// Path fragments injected by hosting/CDN infrastructure (e.g. Cloudflare's
/// email obfuscation endpoints); they never lead to site content
const VENDOR_PATH_MARKERS: &[&str] = &["cdn-cgi"];

/// Returns true if a raw href is worth resolving as a crawl candidate
///
/// Rejects empty hrefs, inter-application schemes (`mailto:`, `tel:`,
/// `javascript:`, matched case-insensitively) and vendor infrastructure paths.
///
/// # Examples
///
/// ```
/// use site_scribe::url::is_followable_href;
///
/// assert!(is_followable_href("/about"));
/// assert!(!is_followable_href("mailto:a@ex.com"));
/// assert!(!is_followable_href("/cdn-cgi/l/email-protection"));
/// ```
pub fn is_followable_href(href: &str) -> bool {
    let href = href.trim();
    if href.is_empty() {
        return false;
    }

    let lower = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return false;
    }

    !VENDOR_PATH_MARKERS.iter().any(|marker| href.contains(marker))
}
