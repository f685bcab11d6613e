//! Page-level data model
//!
//! This module defines the typed content elements produced by the extractor
//! and the per-page result handed from crawl workers to the document sink.

mod element;
mod result;

pub use element::{ContentElement, MAX_HEADING_LEVEL};
pub use result::PageResult;
