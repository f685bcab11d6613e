//! Crawl dispatcher - worker pool and crawl orchestration
//!
//! This module contains the main crawl loop that coordinates:
//! - Seeding the frontier with the base URL
//! - Optional synchronous capture of the base page's header and footer
//! - A fixed pool of workers that fetch, extract and feed links back
//! - The single consuming loop that appends page results to the sink

use crate::config::Config;
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::frontier::{Frontier, QueuedUrl};
use crate::output::{CrawlStatistics, DocumentSink};
use crate::page::PageResult;
use crate::url::normalize_url;
use crate::ScribeError;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinSet;
use url::Url;

/// Main crawl dispatcher
pub struct Dispatcher {
    base_url: Url,
    worker_count: usize,
    capture_site_chrome: bool,
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<Extractor>,
}

impl Dispatcher {
    /// Creates a new dispatcher
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `fetcher` - Source of page markup shared by all workers
    ///
    /// # Returns
    ///
    /// * `Ok(Dispatcher)` - Ready to run
    /// * `Err(ScribeError)` - The base URL could not be normalized
    pub fn new(config: &Config, fetcher: Arc<dyn Fetcher>) -> Result<Self, ScribeError> {
        let base_url = normalize_url(&config.crawler.base_url)?;

        Ok(Self {
            extractor: Arc::new(Extractor::new(base_url.clone())),
            frontier: Arc::new(Frontier::new(
                config.crawler.traversal,
                config.crawler.max_depth,
            )),
            base_url,
            worker_count: config.crawler.worker_count.max(1),
            capture_site_chrome: config.crawler.capture_site_chrome,
            fetcher,
        })
    }

    /// The normalized base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Runs the crawl to completion and finalizes the sink
    ///
    /// Pages are appended to the sink in completion order. The crawl ends
    /// when the frontier drains. A sink failure aborts the crawl: the error
    /// is returned and the worker tasks are aborted with the pool.
    pub async fn run(&self, sink: &mut dyn DocumentSink) -> Result<CrawlStatistics, ScribeError> {
        let start_time = Instant::now();
        let mut stats = CrawlStatistics::default();

        tracing::info!(
            "Starting crawl of {} with {} workers",
            self.base_url,
            self.worker_count
        );

        if self.capture_site_chrome {
            self.process_base_page(sink, &mut stats).await?;
        } else {
            if self.frontier.try_claim(&self.base_url, 0) {
                self.frontier.enqueue(QueuedUrl {
                    url: self.base_url.clone(),
                    depth: 0,
                });
            }
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<PageResult>();
        let mut workers = JoinSet::new();
        for worker_id in 0..self.worker_count {
            workers.spawn(worker_loop(
                worker_id,
                self.frontier.clone(),
                self.fetcher.clone(),
                self.extractor.clone(),
                tx.clone(),
            ));
        }
        drop(tx);

        while let Some(result) = rx.recv().await {
            stats.record(&result);
            sink.append(result.url.as_str(), &result.elements)?;
        }

        while let Some(joined) = workers.join_next().await {
            joined?;
        }

        sink.finalize()?;

        stats.pages_visited = self.frontier.visited_count() as u64;
        stats.elapsed = start_time.elapsed();

        tracing::info!(
            "Crawl completed: {} pages processed ({} failed) in {:?}",
            stats.pages_processed,
            stats.pages_failed,
            stats.elapsed
        );

        Ok(stats)
    }

    /// Processes the base page before any worker starts
    ///
    /// The header and footer are captured from this page only, then the
    /// page itself is appended and its links seed the concurrent phase.
    async fn process_base_page(
        &self,
        sink: &mut dyn DocumentSink,
        stats: &mut CrawlStatistics,
    ) -> Result<(), ScribeError> {
        if !self.frontier.try_claim(&self.base_url, 0) {
            return Ok(());
        }

        let result = match self.fetcher.fetch(&self.base_url).await {
            Ok(html) => {
                let (extraction, chrome) =
                    self.extractor.extract_with_chrome(&html, &self.base_url);

                let header = chrome.header_elements();
                if !header.is_empty() {
                    sink.append_section("Header", &header)?;
                    stats.elements_written += header.len() as u64;
                }
                let footer = chrome.footer_elements();
                if !footer.is_empty() {
                    sink.append_section("Footer", &footer)?;
                    stats.elements_written += footer.len() as u64;
                }

                PageResult::success(self.base_url.clone(), extraction.elements, extraction.links)
            }
            Err(e) => {
                tracing::warn!("Error fetching {}: {}", self.base_url, e);
                PageResult::failure(self.base_url.clone(), e)
            }
        };

        for link in &result.links {
            self.frontier.offer(link.clone(), 1);
        }

        stats.record(&result);
        sink.append(result.url.as_str(), &result.elements)?;
        self.frontier.complete();

        Ok(())
    }
}

/// One crawl worker: pull, fetch, extract, feed links back, emit
async fn worker_loop(
    worker_id: usize,
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<Extractor>,
    results: UnboundedSender<PageResult>,
) {
    tracing::debug!("Worker {} started", worker_id);

    while let Some(task) = frontier.next().await {
        // A panic in the page task becomes a failed result; the claim is
        // still completed below
        let page = {
            let task = task.clone();
            let fetcher = fetcher.clone();
            let extractor = extractor.clone();
            tokio::spawn(async move { process_url(&task, fetcher.as_ref(), &extractor).await })
        };
        let result = match page.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Processing of {} aborted: {}", task.url, e);
                PageResult::failure(
                    task.url.clone(),
                    FetchError::Aborted {
                        url: task.url.to_string(),
                        reason: e.to_string(),
                    },
                )
            }
        };

        // Discovered links are claimed before this task is completed, so the
        // frontier cannot appear drained while they are in flight
        let mut discovered = 0;
        for link in &result.links {
            if frontier.offer(link.clone(), task.depth + 1) {
                discovered += 1;
            }
        }

        tracing::info!(
            "Processed: {} ({} new links, {} pages discovered)",
            task.url,
            discovered,
            frontier.visited_count()
        );

        if results.send(result).is_err() {
            tracing::debug!("Worker {}: result receiver closed", worker_id);
            frontier.complete();
            break;
        }

        frontier.complete();
    }

    tracing::debug!("Worker {} finished", worker_id);
}

/// Fetches and extracts one URL; fetch failures become failed results
async fn process_url(task: &QueuedUrl, fetcher: &dyn Fetcher, extractor: &Extractor) -> PageResult {
    match fetcher.fetch(&task.url).await {
        Ok(html) => {
            let extraction = extractor.extract(&html, &task.url);
            PageResult::success(task.url.clone(), extraction.elements, extraction.links)
        }
        Err(e) => {
            tracing::warn!("Error fetching {}: {}", task.url, e);
            PageResult::failure(task.url.clone(), e)
        }
    }
}
