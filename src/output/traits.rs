//! Document sink trait and output errors
//!
//! The crawl core never formats output itself: it hands ordered content
//! elements to a `DocumentSink`, which is driven from a single consuming loop
//! and therefore never sees concurrent appends.

use crate::page::ContentElement;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Document already finalized")]
    AlreadyFinalized,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Appender that assembles the output document
///
/// Sections are written in the order they are appended. `finalize` persists
/// the document and must be called exactly once, after the last append.
pub trait DocumentSink: Send {
    /// Appends a titled section of content elements
    ///
    /// # Arguments
    ///
    /// * `title` - Section heading (e.g. `Header`, `Page: <url>`)
    /// * `elements` - Content in document order
    fn append_section(&mut self, title: &str, elements: &[ContentElement]) -> OutputResult<()>;

    /// Appends the content of one crawled page
    fn append(&mut self, page_url: &str, elements: &[ContentElement]) -> OutputResult<()> {
        self.append_section(&format!("Page: {}", page_url), elements)
    }

    /// Persists the accumulated document
    fn finalize(&mut self) -> OutputResult<()>;
}
