//! Page fetching boundary
//!
//! The crawler only ever asks two questions of a page: "which URLs does this
//! selector match" and "which single URL does this selector match". This module
//! defines that boundary as the [`PageFetcher`] trait and provides the HTTP
//! implementation used by the binary.

mod extract;
mod http;

pub use extract::{extract_hrefs, parse_selector};
pub use http::{build_http_client, HttpPageFetcher};

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while fetching or reading a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// Result type for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;

/// Extracts URLs from a page given an opaque selector string
///
/// Implementations must be usable from concurrent tasks; the crawler shares
/// one fetcher across every feed.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns every URL matched by `selector` on the page at `url`, in page order
    async fn fetch_many(&self, url: &str, selector: &str) -> FetchResult<Vec<String>>;

    /// Returns the first URL matched by `selector` on the page at `url`
    async fn fetch_one(&self, url: &str, selector: &str) -> FetchResult<Option<String>>;

    /// Runs an "entries" and a "next" extraction against the same page
    ///
    /// The default issues both lookups concurrently; implementations that can
    /// answer both from a single download should override it.
    async fn fetch_listing(
        &self,
        url: &str,
        entries: &str,
        next: &str,
    ) -> FetchResult<(Vec<String>, Option<String>)> {
        tokio::try_join!(self.fetch_many(url, entries), self.fetch_one(url, next))
    }
}
