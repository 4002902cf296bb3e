//! Crawl orchestration
//!
//! Wires one run together: the connection pool, both consumer loops, and one
//! task per configured feed. Feeds run independently of each other; the run
//! ends once every feed task is done and both queues have drained.

use crate::config::{Config, FeedEntry};
use crate::feed::{drive_feed, prepare_reader, FailureDecision, FeedOutcome, HtmlFeedReader};
use crate::fetch::{build_http_client, HttpPageFetcher, PageFetcher};
use crate::pipeline::{
    delivery_queue, error_queue, store_articles, store_errors, DeliveryQueue, PipelineCounters,
    PipelineStats,
};
use crate::storage::{CheckpointStore, ConnectionPool, SqliteCheckpointStore};
use crate::Result;
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;

/// What happened during one run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Feeds that finished, were suspended, or were skipped
    pub outcomes: Vec<FeedOutcome>,

    /// Feeds that stopped with an error: (feed, message)
    pub failures: Vec<(String, String)>,

    /// Pipeline counters after both queues drained
    pub stats: PipelineStats,
}

/// Everything a feed task needs, shared across tasks
#[derive(Clone)]
struct FeedContext {
    fetcher: Arc<dyn PageFetcher>,
    checkpoints: Arc<dyn CheckpointStore>,
    delivery: DeliveryQueue,
    policy: FailureDecision,
    link_workers: usize,
    fresh: bool,
}

/// Runs every configured feed to completion
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash stamped onto every checkpoint written by this run
/// * `fresh` - Ignore stored checkpoints and start each feed from its first page
///
/// # Returns
///
/// * `Ok(RunReport)` - Every feed task ended; individual feed errors are in the report
/// * `Err(EvenflowError)` - Storage or HTTP client could not be set up
pub async fn run_crawl(config: &Config, config_hash: &str, fresh: bool) -> Result<RunReport> {
    let pool = ConnectionPool::open(
        Path::new(&config.storage.database_path),
        config.storage.pool_size,
    )?;
    let client = build_http_client(&config.crawler)?;

    let counters = Arc::new(PipelineCounters::new());
    let (delivery_tx, delivery_rx) = delivery_queue();
    let (error_tx, error_rx) = error_queue();

    let article_task = tokio::spawn(store_articles(
        pool.clone(),
        delivery_rx,
        error_tx,
        Arc::clone(&counters),
    ));
    let error_task = tokio::spawn(store_errors(pool.clone(), error_rx, Arc::clone(&counters)));

    let context = FeedContext {
        fetcher: Arc::new(HttpPageFetcher::new(client)),
        checkpoints: Arc::new(SqliteCheckpointStore::new(pool.clone(), config_hash)),
        delivery: delivery_tx,
        policy: config.crawler.on_fetch_error,
        link_workers: config.crawler.link_workers,
        fresh,
    };

    let tasks = config.feeds.iter().cloned().map(|entry| {
        let context = context.clone();
        let name = entry.name.clone();
        let handle = tokio::spawn(async move { run_feed(entry, context).await });
        (name, handle)
    });
    let (names, handles): (Vec<_>, Vec<_>) = tasks.unzip();
    let results = join_all(handles).await;

    // Consumers stop once the last delivery sender is gone
    drop(context);

    let mut report = RunReport {
        outcomes: Vec::new(),
        failures: Vec::new(),
        stats: PipelineStats::default(),
    };
    for (name, result) in names.into_iter().zip(results) {
        match result {
            Ok(Ok(outcome)) => report.outcomes.push(outcome),
            Ok(Err(e)) => {
                tracing::error!("Feed {} failed: {}", name, e);
                report.failures.push((name, e.to_string()));
            }
            Err(e) => {
                tracing::error!("Feed {} task panicked: {}", name, e);
                report.failures.push((name, e.to_string()));
            }
        }
    }

    if let Err(e) = article_task.await {
        tracing::error!("Article consumer ended abnormally: {}", e);
    }
    if let Err(e) = error_task.await {
        tracing::error!("Error consumer ended abnormally: {}", e);
    }

    report.stats = counters.snapshot();
    Ok(report)
}

async fn run_feed(entry: FeedEntry, context: FeedContext) -> Result<FeedOutcome> {
    let reader = HtmlFeedReader::from_entry(&entry).with_link_workers(context.link_workers);

    match prepare_reader(reader, context.checkpoints.as_ref(), context.fresh).await? {
        Some(reader) => {
            drive_feed(
                Box::new(reader),
                context.fetcher.as_ref(),
                context.checkpoints.as_ref(),
                &context.delivery,
                &context.policy,
            )
            .await
        }
        None => Ok(FeedOutcome::skipped(entry.name)),
    }
}
