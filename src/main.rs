//! Site-Scribe main entry point
//!
//! This is the command-line interface for the Site-Scribe documentation crawler.

use anyhow::Context;
use clap::Parser;
use site_scribe::config::{load_config_with_hash, override_destination, Config};
use site_scribe::output::print_statistics;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Scribe: crawl a website into a single document
///
/// Site-Scribe starts at a base URL, follows every same-domain link exactly
/// once with a pool of concurrent workers, and writes the headings,
/// paragraphs, tables and lists of each page into one Markdown document or
/// SQLite database.
#[derive(Parser, Debug)]
#[command(name = "site-scribe")]
#[command(version)]
#[command(about = "Crawl a website into a single document", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Override the configured output destination
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if let Some(destination) = cli.output {
        tracing::info!("Output destination overridden: {}", destination);
        override_destination(&mut config, destination).context("Invalid --output value")?;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_scribe=info,warn"),
            1 => EnvFilter::new("site_scribe=debug,info"),
            2 => EnvFilter::new("site_scribe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Site-Scribe Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Workers: {}", config.crawler.worker_count);
    println!("  Settle delay: {}ms", config.crawler.settle_delay_ms);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Traversal: {:?}", config.crawler.traversal);
    println!("  Capture site chrome: {}", config.crawler.capture_site_chrome);

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Request timeout: {}s", config.fetcher.request_timeout_secs);
    println!("  Connect timeout: {}s", config.fetcher.connect_timeout_secs);

    println!("\nOutput:");
    println!("  Destination: {}", config.output.destination);
    println!("  Format: {:?}", config.output.format);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, quiet: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} into {}",
        config.crawler.base_url,
        config.output.destination
    );

    let stats = site_scribe::crawl(config).await.context("Crawl failed")?;

    tracing::info!("Crawl completed successfully");
    if !quiet {
        println!();
        print_statistics(&stats);
    }

    Ok(())
}
