use crate::fetch::FetchError;
use serde::Deserialize;

/// What the crawl driver does with a page that could not be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureDecision {
    /// Stop the feed and return the error to the caller
    Abort,

    /// Stop the feed for this run, keeping the last checkpoint so the next
    /// run retries the same page
    #[default]
    Suspend,
}

/// Decides how a fetch failure affects the feed being crawled
pub trait FetchFailurePolicy: Send + Sync {
    fn on_fetch_error(&self, feed: &str, error: &FetchError) -> FailureDecision;
}

/// A fixed decision applies to every failure
impl FetchFailurePolicy for FailureDecision {
    fn on_fetch_error(&self, _feed: &str, _error: &FetchError) -> FailureDecision {
        *self
    }
}
