use crate::crawler::FetchError;
use crate::page::ContentElement;
use std::collections::BTreeSet;
use url::Url;

/// Outcome of processing one claimed URL
#[derive(Debug)]
pub struct PageResult {
    /// The normalized page URL
    pub url: Url,

    /// Content elements in document order
    pub elements: Vec<ContentElement>,

    /// Same-domain links discovered on the page
    pub links: BTreeSet<Url>,

    /// Set when the page could not be fetched
    pub error: Option<FetchError>,
}

impl PageResult {
    /// Creates a result for a successfully extracted page
    pub fn success(url: Url, elements: Vec<ContentElement>, links: BTreeSet<Url>) -> Self {
        Self {
            url,
            elements,
            links,
            error: None,
        }
    }

    /// Creates a result for a page whose fetch failed; it carries no content
    /// and no links
    pub fn failure(url: Url, error: FetchError) -> Self {
        Self {
            url,
            elements: Vec::new(),
            links: BTreeSet::new(),
            error: Some(error),
        }
    }

    /// Returns true if the page was fetched and extracted
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
