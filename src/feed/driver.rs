//! Crawl driver
//!
//! Owns the step loop for one feed: crawl a page, hand its links to the
//! delivery queue, checkpoint, move on to the successor. Pages of one feed are
//! strictly sequential; separate feeds run as independent tasks.

use crate::feed::policy::{FailureDecision, FetchFailurePolicy};
use crate::feed::reader::FeedReader;
use crate::feed::state::Recovery;
use crate::fetch::PageFetcher;
use crate::pipeline::DeliveryQueue;
use crate::storage::{ArticleRecord, CheckpointStore};
use crate::{EvenflowError, Result};

/// How a feed's run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// The last page was crawled and a finished checkpoint written
    Completed,
    /// A page failed and the policy chose to stop until the next run
    Suspended,
    /// The stored checkpoint says the feed already finished
    Skipped,
}

/// Summary of one feed's run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedOutcome {
    pub feed: String,
    pub pages: usize,
    pub links: usize,
    pub status: FeedStatus,
}

impl FeedOutcome {
    pub fn skipped(feed: impl Into<String>) -> Self {
        Self {
            feed: feed.into(),
            pages: 0,
            links: 0,
            status: FeedStatus::Skipped,
        }
    }
}

/// Seeds a freshly configured reader from its stored checkpoint
///
/// # Returns
///
/// * `Ok(Some(reader))` - Reader to crawl, resumed if a live checkpoint existed
/// * `Ok(None)` - The checkpoint says the feed already finished
/// * `Err(EvenflowError)` - The checkpoint could not be loaded or decoded
pub async fn prepare_reader<R: FeedReader>(
    mut reader: R,
    checkpoints: &dyn CheckpointStore,
    fresh: bool,
) -> Result<Option<R>> {
    if fresh {
        tracing::info!("Feed {}: starting fresh", reader.name());
        return Ok(Some(reader));
    }

    let Some(state) = checkpoints.load(reader.name()).await? else {
        tracing::info!("Feed {}: no checkpoint, starting from the top", reader.name());
        return Ok(Some(reader));
    };

    match reader.recover(&state)? {
        Recovery::Resumed => {
            tracing::info!(
                "Feed {}: resuming at {}",
                reader.name(),
                state.url().unwrap_or("?")
            );
            Ok(Some(reader))
        }
        Recovery::Declined => {
            tracing::info!("Feed {}: already finished, skipping", reader.name());
            Ok(None)
        }
    }
}

/// Crawls a feed until it is over, checkpointing after every page
///
/// Each page's links go to the delivery queue as one batch before its state is
/// saved. Fetch failures go through `policy`: `Abort` returns the error,
/// `Suspend` ends the run and leaves the last checkpoint in place.
pub async fn drive_feed(
    reader: Box<dyn FeedReader>,
    fetcher: &dyn PageFetcher,
    checkpoints: &dyn CheckpointStore,
    delivery: &DeliveryQueue,
    policy: &dyn FetchFailurePolicy,
) -> Result<FeedOutcome> {
    let feed = reader.name().to_string();
    let mut outcome = FeedOutcome {
        feed: feed.clone(),
        pages: 0,
        links: 0,
        status: FeedStatus::Completed,
    };

    let mut current = reader;
    loop {
        let step = match current.fetch_links(fetcher).await {
            Ok(step) => step,
            Err(e) => match policy.on_fetch_error(&feed, &e) {
                FailureDecision::Abort => {
                    tracing::error!("Feed {}: aborting after fetch failure: {}", feed, e);
                    return Err(e.into());
                }
                FailureDecision::Suspend => {
                    tracing::warn!("Feed {}: suspending after fetch failure: {}", feed, e);
                    outcome.status = FeedStatus::Suspended;
                    return Ok(outcome);
                }
            },
        };

        outcome.pages += 1;
        let batch = ArticleRecord::batch_from_links(&feed, step.links);
        outcome.links += batch.len();
        tracing::info!(
            "Feed {}: page {} yielded {} links",
            feed,
            outcome.pages,
            batch.len()
        );

        if !batch.is_empty() {
            delivery
                .send(batch)
                .map_err(|_| EvenflowError::QueueClosed { feed: feed.clone() })?;
        }

        checkpoints.save(&step.state).await?;

        match step.next_reader {
            Some(next) => current = next,
            None => break,
        }
    }

    tracing::info!(
        "Feed {}: finished after {} pages, {} links",
        feed,
        outcome.pages,
        outcome.links
    );
    Ok(outcome)
}
