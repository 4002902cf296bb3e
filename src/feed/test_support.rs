//! In-memory page fetcher for crawler tests

use crate::feed::Selectors;
use crate::fetch::{FetchError, FetchResult, PageFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves canned listing and entry pages keyed by URL
///
/// Unknown URLs answer with a 404 [`FetchError::Status`].
#[derive(Debug, Default)]
pub struct StubFetcher {
    selectors: Selectors,
    listings: HashMap<String, (Vec<String>, Option<String>)>,
    entries: HashMap<String, Vec<String>>,
    requests: AtomicUsize,
}

impl StubFetcher {
    pub fn new(selectors: Selectors) -> Self {
        Self {
            selectors,
            ..Self::default()
        }
    }

    pub fn listing(mut self, url: &str, entries: &[&str], next: Option<&str>) -> Self {
        self.listings.insert(
            url.to_string(),
            (
                entries.iter().map(|e| e.to_string()).collect(),
                next.map(str::to_string),
            ),
        );
        self
    }

    pub fn entry(mut self, url: &str, links: &[&str]) -> Self {
        self.entries
            .insert(url.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Number of selector lookups served so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn not_found(url: &str) -> FetchError {
        FetchError::Status {
            url: url.to_string(),
            status: 404,
        }
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_many(&self, url: &str, selector: &str) -> FetchResult<Vec<String>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if selector == self.selectors.entries {
            self.listings
                .get(url)
                .map(|(entries, _)| entries.clone())
                .ok_or_else(|| Self::not_found(url))
        } else if selector == self.selectors.links {
            self.entries
                .get(url)
                .cloned()
                .ok_or_else(|| Self::not_found(url))
        } else {
            Ok(Vec::new())
        }
    }

    async fn fetch_one(&self, url: &str, selector: &str) -> FetchResult<Option<String>> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if selector != self.selectors.next {
            return Ok(None);
        }
        self.listings
            .get(url)
            .map(|(_, next)| next.clone())
            .ok_or_else(|| Self::not_found(url))
    }
}
