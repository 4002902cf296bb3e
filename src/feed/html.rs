//! HTML feed reader
//!
//! Crawls feeds whose listing pages are plain HTML: the listing page links to
//! entry pages (sections, categories) and to the next listing page, and every
//! entry page links to articles.

use crate::config::FeedEntry;
use crate::feed::reader::{CrawlStepResult, FeedReader, LinkMap, LinkOrigin};
use crate::feed::selectors::Selectors;
use crate::feed::state::{CrawlState, DepthBound, Recovery, StateError};
use crate::fetch::{FetchError, FetchResult, PageFetcher};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

/// Reader for one listing page of an HTML feed
#[derive(Debug, Clone)]
pub struct HtmlFeedReader {
    name: String,
    url: String,
    depth: DepthBound,
    selectors: Arc<Selectors>,
    fake: bool,
    link_workers: usize,
}

impl HtmlFeedReader {
    /// Creates a reader positioned at the first listing page of a feed
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        selectors: impl Into<Arc<Selectors>>,
        depth: DepthBound,
        fake: bool,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            depth,
            selectors: selectors.into(),
            fake,
            link_workers: 1,
        }
    }

    /// Creates a reader from a configured feed
    pub fn from_entry(entry: &FeedEntry) -> Self {
        Self::new(
            entry.name.clone(),
            entry.url.clone(),
            entry.selectors.clone(),
            entry.depth(),
            entry.fake,
        )
    }

    /// Sets how many entry pages may be fetched at once
    pub fn with_link_workers(mut self, workers: usize) -> Self {
        self.link_workers = workers.max(1);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn depth(&self) -> DepthBound {
        self.depth
    }

    pub fn selectors(&self) -> &Selectors {
        &self.selectors
    }

    pub fn is_fake(&self) -> bool {
        self.fake
    }

    /// Builds the reader for the next listing page, if the budget allows one
    fn next_page(&self, url: String) -> Option<Self> {
        if self.depth.is_exhausted() {
            return None;
        }

        if url == self.url {
            tracing::warn!(
                "Feed {}: next page link points back at {}, stopping",
                self.name,
                url
            );
            return None;
        }

        Some(Self {
            name: self.name.clone(),
            url,
            depth: self.depth.decrement(),
            selectors: Arc::clone(&self.selectors),
            fake: self.fake,
            link_workers: self.link_workers,
        })
    }

    /// Collects article links from every entry page
    ///
    /// Entry pages are fetched `link_workers` at a time but merged in the order
    /// the listing page gave them, so when two entries link the same article
    /// the later entry wins.
    async fn links_from(&self, fetcher: &dyn PageFetcher, entries: Vec<String>) -> FetchResult<LinkMap> {
        let selector = self.selectors.links.as_str();
        let pages: Vec<(String, Vec<String>)> = stream::iter(entries)
            .map(|entry| async move {
                let links = fetcher.fetch_many(&entry, selector).await?;
                Ok::<_, FetchError>((entry, links))
            })
            .buffered(self.link_workers)
            .try_collect()
            .await?;

        let mut all_links = LinkMap::new();
        for (entry, links) in pages {
            for link in links {
                all_links.insert(
                    link,
                    LinkOrigin {
                        source: entry.clone(),
                        fake: self.fake,
                    },
                );
            }
        }

        Ok(all_links)
    }
}

#[async_trait]
impl FeedReader for HtmlFeedReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn to_state(&self, is_over: bool) -> CrawlState {
        CrawlState::new(self.name.clone(), is_over, &self.url, self.depth)
    }

    fn recover(&mut self, state: &CrawlState) -> Result<Recovery, StateError> {
        if state.is_over {
            return Ok(Recovery::Declined);
        }

        if state.name != self.name {
            return Err(StateError::NameMismatch {
                expected: self.name.clone(),
                found: state.name.clone(),
            });
        }

        let url = state.url()?.to_string();
        let depth = state.depth()?;
        self.url = url;
        self.depth = depth;
        Ok(Recovery::Resumed)
    }

    async fn fetch_links(&self, fetcher: &dyn PageFetcher) -> FetchResult<CrawlStepResult> {
        let (entries, next_page) = fetcher
            .fetch_listing(&self.url, &self.selectors.entries, &self.selectors.next)
            .await?;
        tracing::debug!(
            "Feed {}: {} has {} entries, next page {:?}",
            self.name,
            self.url,
            entries.len(),
            next_page
        );

        let next_reader = next_page.and_then(|url| self.next_page(url));
        let links = self.links_from(fetcher, entries).await?;

        let state = match &next_reader {
            Some(next) => next.to_state(false),
            None => self.to_state(true),
        };

        Ok(CrawlStepResult {
            links,
            next_reader: next_reader.map(|next| Box::new(next) as Box<dyn FeedReader>),
            state,
        })
    }
}
