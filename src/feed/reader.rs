//! The feed reader capability
//!
//! Readers are immutable once they start crawling: a step never changes the
//! reader it ran on, it produces the successor instead. The only mutation is
//! [`FeedReader::recover`], used to seed a fresh reader from a checkpoint.

use crate::feed::state::{CrawlState, Recovery, StateError};
use crate::fetch::{FetchResult, PageFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

/// Where an article link was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOrigin {
    /// Entry page the link was harvested from
    pub source: String,
    /// Whether the feed is labelled fake
    pub fake: bool,
}

/// Article URL -> origin of the link
pub type LinkMap = HashMap<String, LinkOrigin>;

/// Output of one pagination step
#[derive(Debug)]
pub struct CrawlStepResult {
    /// Article links harvested from this page's entries
    pub links: LinkMap,

    /// Reader for the next listing page, `None` once the feed is over
    pub next_reader: Option<Box<dyn FeedReader>>,

    /// Checkpoint to persist after this step
    ///
    /// While the feed goes on it positions a resumed crawl at the next page;
    /// `next_reader` is `None` exactly when `state.is_over` is set.
    pub state: CrawlState,
}

impl CrawlStepResult {
    pub fn is_over(&self) -> bool {
        self.state.is_over
    }
}

/// A resumable, paginated source of article links
#[async_trait]
pub trait FeedReader: Send + Sync + fmt::Debug {
    /// Feed name, also the checkpoint key
    fn name(&self) -> &str;

    /// Snapshots this reader's position
    fn to_state(&self, is_over: bool) -> CrawlState;

    /// Seeds this reader from a stored checkpoint
    ///
    /// Finished states are declined rather than treated as errors.
    fn recover(&mut self, state: &CrawlState) -> Result<Recovery, StateError>;

    /// Crawls the current listing page
    ///
    /// Fetch failures are returned to the caller untouched; deciding whether a
    /// failed page aborts the feed belongs to the driver.
    async fn fetch_links(&self, fetcher: &dyn PageFetcher) -> FetchResult<CrawlStepResult>;
}
