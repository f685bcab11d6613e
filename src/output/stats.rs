//! Crawl statistics
//!
//! Counters are accumulated by the consuming loop as page results arrive and
//! printed by the CLI once the document has been finalized.

use crate::page::PageResult;
use std::time::Duration;

/// Crawl statistics summary
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    /// Pages fetched and extracted successfully
    pub pages_processed: u64,

    /// Pages whose fetch failed
    pub pages_failed: u64,

    /// Content elements appended to the document
    pub elements_written: u64,

    /// Distinct URLs claimed by the frontier
    pub pages_visited: u64,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Records the outcome of one page
    pub fn record(&mut self, result: &PageResult) {
        if result.is_success() {
            self.pages_processed += 1;
        } else {
            self.pages_failed += 1;
        }
        self.elements_written += result.elements.len() as u64;
    }

    /// Total pages that reached the sink
    pub fn total_pages(&self) -> u64 {
        self.pages_processed + self.pages_failed
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Distinct URLs visited: {}", stats.pages_visited);
    println!("  Pages processed: {}", stats.pages_processed);
    println!("  Pages failed: {}", stats.pages_failed);
    println!("  Elements written: {}", stats.elements_written);
    println!("  Elapsed: {:.1}s", stats.elapsed.as_secs_f64());
    println!();

    let total = stats.total_pages();
    let success_rate = if total > 0 {
        (stats.pages_processed as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        success_rate, stats.pages_processed, total
    );
}
