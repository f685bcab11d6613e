use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Site-Scribe
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Starting URL; its authority also defines the same-domain filter
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Number of parallel crawl workers
    #[serde(rename = "worker-count", default = "default_worker_count")]
    pub worker_count: usize,

    /// Time to wait after requesting a page before reading its markup
    /// (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Maximum link distance from the base URL
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Order in which queued URLs are handed to workers
    #[serde(default)]
    pub traversal: TraversalOrder,

    /// Capture header and footer from the base URL's page before crawling
    #[serde(rename = "capture-site-chrome", default)]
    pub capture_site_chrome: bool,
}

impl CrawlerConfig {
    /// Settle delay as a `Duration`
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Frontier pop order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    /// Oldest queued URL first
    #[default]
    BreadthFirst,
    /// Most recently queued URL first
    DepthFirst,
}

/// Page fetcher configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Destination path of the assembled document
    pub destination: String,

    /// Document format
    #[serde(default)]
    pub format: OutputFormat,
}

/// Supported document formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Sqlite,
}

fn default_worker_count() -> usize {
    5
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_max_depth() -> u32 {
    200
}

fn default_user_agent() -> String {
    format!("site-scribe/{}", env!("CARGO_PKG_VERSION"))
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

impl Config {
    /// Builds a configuration with defaults for everything but the base URL
    /// and output destination
    pub fn new(base_url: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            crawler: CrawlerConfig {
                base_url: base_url.into(),
                worker_count: default_worker_count(),
                settle_delay_ms: default_settle_delay_ms(),
                max_depth: default_max_depth(),
                traversal: TraversalOrder::default(),
                capture_site_chrome: false,
            },
            fetcher: FetcherConfig::default(),
            output: OutputConfig {
                destination: destination.into(),
                format: OutputFormat::default(),
            },
        }
    }
}
