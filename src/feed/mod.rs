//! Feed crawling
//!
//! A feed is a chain of listing pages. Each [`FeedReader`] crawls exactly one
//! listing page per step and hands back a fresh reader for the next page, so a
//! crawl is a sequence of immutable readers with a checkpoint between each.
//!
//! # Components
//!
//! - `Selectors`: the three extraction rules shared by every page of a feed
//! - `CrawlState` / `DepthBound`: serializable progress of one reader
//! - `FeedReader` / `HtmlFeedReader`: the pagination state machine
//! - `drive_feed`: the step loop that checkpoints and delivers each page

mod driver;
mod html;
mod policy;
mod reader;
mod selectors;
mod state;

pub use driver::{drive_feed, prepare_reader, FeedOutcome, FeedStatus};
pub use html::HtmlFeedReader;
pub use policy::{FailureDecision, FetchFailurePolicy};
pub use reader::{CrawlStepResult, FeedReader, LinkMap, LinkOrigin};
pub use selectors::Selectors;
pub use state::{CrawlState, DepthBound, Recovery, StateError, PAGE_KEY, URL_KEY};

#[cfg(test)]
pub(crate) mod test_support;
