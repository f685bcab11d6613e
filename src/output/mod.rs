//! Output module for assembling the crawled document
//!
//! This module handles:
//! - The `DocumentSink` seam the crawl core appends to
//! - Markdown and SQLite renditions of the document
//! - Crawl statistics

mod markdown;
mod schema;
mod sqlite_output;
pub mod stats;
mod traits;

pub use markdown::{format_element, MarkdownSink};
pub use schema::{initialize_schema, SCHEMA_SQL};
pub use sqlite_output::SqliteSink;
pub use stats::{print_statistics, CrawlStatistics};
pub use traits::{DocumentSink, OutputError, OutputResult};

use crate::config::{OutputConfig, OutputFormat};
use std::path::Path;

/// Opens the sink selected by the output configuration
///
/// # Arguments
///
/// * `config` - Output destination and format
///
/// # Returns
///
/// * `Ok(Box<dyn DocumentSink>)` - Sink ready for appends
/// * `Err(OutputError)` - The destination could not be opened
pub fn open_sink(config: &OutputConfig) -> OutputResult<Box<dyn DocumentSink>> {
    let path = Path::new(&config.destination);

    let sink: Box<dyn DocumentSink> = match config.format {
        OutputFormat::Markdown => Box::new(MarkdownSink::new(path)),
        OutputFormat::Sqlite => Box::new(SqliteSink::new(path)?),
    };

    tracing::debug!(
        "Opened {:?} sink at {}",
        config.format,
        config.destination
    );
    Ok(sink)
}
