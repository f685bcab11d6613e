//! URL handling module for Site-Scribe
//!
//! This module provides URL normalization, the same-domain filter and href
//! screening used by the link pass of the extractor.

mod domain;
mod filter;
mod normalize;

use url::Url;

// Re-export main functions
pub use domain::{extract_domain, same_authority};
pub use filter::is_followable_href;
pub use normalize::{normalize_parsed, normalize_url};

/// Resolves an href found on `page_url` into a same-domain crawl candidate
///
/// Runs the full link pipeline: href screening, resolution against the page
/// URL, normalization and the same-domain check against `base`.
///
/// # Returns
///
/// * `Some(Url)` - Normalized URL on the base URL's domain
/// * `None` - The href should not be followed
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_scribe::url::resolve_link;
///
/// let base = Url::parse("http://ex.com/").unwrap();
/// let link = resolve_link("/b?x=1#frag", &base, &base).unwrap();
/// assert_eq!(link.as_str(), "http://ex.com/b");
/// assert!(resolve_link("http://other.com/c", &base, &base).is_none());
/// ```
pub fn resolve_link(href: &str, page_url: &Url, base: &Url) -> Option<Url> {
    if !is_followable_href(href) {
        return None;
    }

    let absolute = page_url.join(href.trim()).ok()?;
    let normalized = normalize_parsed(absolute).ok()?;

    same_authority(base, &normalized).then_some(normalized)
}
