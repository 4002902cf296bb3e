//! Evenflow main entry point
//!
//! This is the command-line interface for the Evenflow feed crawler.

use anyhow::Context;
use clap::Parser;
use evenflow::config::{load_config_with_hash, Config};
use evenflow::feed::FeedStatus;
use evenflow::runner::run_crawl;
use evenflow::storage::{ConnectionPool, SqliteCheckpointStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Evenflow: a resumable feed crawler
///
/// Evenflow walks paginated feeds page by page, checkpoints its position after
/// every page, and stores harvested article links in SQLite. Rows that cannot
/// be stored are recorded in a separate error table.
#[derive(Parser, Debug)]
#[command(name = "evenflow")]
#[command(version)]
#[command(about = "A resumable feed crawler", long_about = None)]
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

    /// Ignore stored checkpoints and crawl every feed from its first page
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["checkpoints", "fresh"])]
    dry_run: bool,

    /// Show stored feed checkpoints and exit
    #[arg(long, conflicts_with_all = ["dry_run", "fresh"])]
    checkpoints: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.checkpoints {
        handle_checkpoints(&config, &config_hash).await?;
    } else {
        handle_crawl(&config, &config_hash, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("evenflow=info,warn"),
            1 => EnvFilter::new("evenflow=debug,info"),
            2 => EnvFilter::new("evenflow=trace,debug"),
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

/// Handles the --dry-run mode: shows the feeds that would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Evenflow Dry Run ===\n");

    println!("Storage:");
    println!("  Database: {}", config.storage.database_path);
    println!("  Pool size: {}", config.storage.pool_size);

    println!("\nCrawler:");
    println!("  Link workers: {}", config.crawler.link_workers);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  User agent: {}", config.crawler.user_agent);
    println!("  On fetch error: {:?}", config.crawler.on_fetch_error);

    println!("\nFeeds ({}):", config.feeds.len());
    for feed in &config.feeds {
        let depth = match feed.stop_after {
            Some(pages) => format!("{} more pages", pages),
            None => "unbounded".to_string(),
        };
        let label = if feed.fake { " [fake]" } else { "" };
        println!("  - {}{} ({})", feed.name, label, depth);
        println!("    url:     {}", feed.url);
        println!("    next:    {}", feed.selectors.next);
        println!("    entries: {}", feed.selectors.entries);
        println!("    links:   {}", feed.selectors.links);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --checkpoints mode: lists stored feed states
async fn handle_checkpoints(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let pool = ConnectionPool::open(Path::new(&config.storage.database_path), 1)?;
    let store = SqliteCheckpointStore::new(pool, config_hash);
    let stored = store.list().await?;

    println!("Database: {}\n", config.storage.database_path);
    if stored.is_empty() {
        println!("No checkpoints stored");
        return Ok(());
    }

    for checkpoint in stored {
        let state = &checkpoint.state;
        let position = if state.is_over {
            "finished".to_string()
        } else {
            format!(
                "next {} (page budget {})",
                state.url().unwrap_or("?"),
                state
                    .depth()
                    .map(|d| d.to_counter().to_string())
                    .unwrap_or_else(|_| "?".to_string())
            )
        };
        let stale = if checkpoint.config_hash != config_hash {
            " [written by a different config]"
        } else {
            ""
        };
        println!(
            "  {}: {} (updated {}){}",
            state.name, position, checkpoint.updated_at, stale
        );
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring stored checkpoints)");
    } else {
        tracing::info!("Starting crawl (resuming from stored checkpoints)");
    }
    tracing::info!("Feeds: {}", config.feeds.len());

    let report = run_crawl(config, config_hash, fresh).await?;

    println!("\n=== Feeds ===");
    for outcome in &report.outcomes {
        let status = match outcome.status {
            FeedStatus::Completed => "completed",
            FeedStatus::Suspended => "suspended",
            FeedStatus::Skipped => "skipped (already finished)",
        };
        println!(
            "  {}: {} ({} pages, {} links)",
            outcome.feed, status, outcome.pages, outcome.links
        );
    }
    for (feed, error) in &report.failures {
        println!("  {}: failed: {}", feed, error);
    }

    println!("\n=== Pipeline ===");
    println!("{}", report.stats);

    if !report.failures.is_empty() {
        anyhow::bail!("{} feed(s) failed", report.failures.len());
    }
    Ok(())
}
