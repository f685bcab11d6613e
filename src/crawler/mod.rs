//! Crawler module for page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Page fetching through isolated render sessions
//! - Content and link extraction
//! - The deduplicating frontier
//! - The worker pool and overall crawl coordination

mod dispatcher;
mod extractor;
mod fetcher;
mod frontier;

pub use dispatcher::Dispatcher;
pub use extractor::{heading_level, Extraction, Extractor, SiteChrome};
pub use fetcher::{FetchError, Fetcher, HttpFetcher, RenderSession};
pub use frontier::{Frontier, QueuedUrl};

use crate::config::Config;
use crate::output::{open_sink, CrawlStatistics};
use crate::ScribeError;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher
/// 2. Open the configured document sink
/// 3. Crawl the site from the base URL until the frontier drains
/// 4. Finalize the document
///
/// # Arguments
///
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Crawl completed and the document was written
/// * `Err(ScribeError)` - Crawl failed
///
/// # Example
///
/// ```no_run
/// use site_scribe::config::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("scribe.toml"))?;
/// let stats = site_scribe::crawl(config).await?;
/// println!("{} pages", stats.pages_processed);
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config) -> Result<CrawlStatistics, ScribeError> {
    let fetcher = Arc::new(HttpFetcher::new(
        config.fetcher.clone(),
        config.crawler.settle_delay(),
    ));
    let dispatcher = Dispatcher::new(&config, fetcher)?;
    let mut sink = open_sink(&config.output)?;

    dispatcher.run(sink.as_mut()).await
}
