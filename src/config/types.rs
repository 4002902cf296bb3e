use crate::feed::{DepthBound, FailureDecision, Selectors};
use serde::Deserialize;

/// Main configuration structure for Evenflow
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "feed")]
    pub feeds: Vec<FeedEntry>,
}

/// Relational sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Number of connections shared by the consumer loops and checkpoint store
    #[serde(rename = "pool-size", default = "default_pool_size")]
    pub pool_size: usize,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of entry pages fetched concurrently within one step
    #[serde(rename = "link-workers", default = "default_link_workers")]
    pub link_workers: usize,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// User agent sent with every request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// What the driver does when a page cannot be fetched
    #[serde(rename = "on-fetch-error", default)]
    pub on_fetch_error: FailureDecision,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            link_workers: default_link_workers(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
            on_fetch_error: FailureDecision::default(),
        }
    }
}

/// One paginated feed to crawl
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntry {
    /// Unique feed name, also the checkpoint key
    pub name: String,

    /// URL of the first listing page
    pub url: String,

    /// Additional pages to crawl after the first; omitted means unbounded
    #[serde(rename = "stop-after", default)]
    pub stop_after: Option<u32>,

    /// Whether articles from this feed are labelled fake
    #[serde(default)]
    pub fake: bool,

    pub selectors: Selectors,
}

impl FeedEntry {
    /// The pagination bound this entry asks for
    pub fn depth(&self) -> DepthBound {
        match self.stop_after {
            Some(pages) => DepthBound::Pages(pages),
            None => DepthBound::Unbounded,
        }
    }
}

fn default_pool_size() -> usize {
    4
}

fn default_link_workers() -> usize {
    2
}

fn default_request_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("evenflow/{}", env!("CARGO_PKG_VERSION"))
}
