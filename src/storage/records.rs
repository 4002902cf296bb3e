//! Row records written by the delivery pipeline

use crate::feed::LinkMap;
use crate::storage::SqlRecord;
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use std::collections::HashMap;
use std::fmt::Display;

/// Table receiving harvested articles
pub const ARTICLE_TABLE: &str = "article";

/// Table receiving rows that failed to land in [`ARTICLE_TABLE`]
pub const ERROR_TABLE: &str = "error";

/// One harvested article link
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    /// Article URL
    pub url: String,

    /// Entry page the link was found on
    pub source: String,

    /// Whether the feed is labelled fake
    pub fake: bool,

    /// Feed that harvested the link
    pub feed: String,

    pub discovered_at: DateTime<Utc>,
}

impl ArticleRecord {
    pub fn new(
        url: impl Into<String>,
        source: impl Into<String>,
        fake: bool,
        feed: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
            fake,
            feed: feed.into(),
            discovered_at: Utc::now(),
        }
    }

    /// Turns one crawl step's links into a batch, ordered by URL
    pub fn batch_from_links(feed: &str, links: LinkMap) -> Vec<Self> {
        let mut batch: Vec<Self> = links
            .into_iter()
            .map(|(url, origin)| Self::new(url, origin.source, origin.fake, feed))
            .collect();
        batch.sort_by(|a, b| a.url.cmp(&b.url));
        batch
    }
}

impl SqlRecord for ArticleRecord {
    fn columns() -> &'static [&'static str] {
        &["url", "source", "fake", "feed", "discovered_at"]
    }

    fn to_sql_map(&self) -> HashMap<&'static str, Value> {
        HashMap::from([
            ("url", Value::Text(self.url.clone())),
            ("source", Value::Text(self.source.clone())),
            ("fake", Value::Integer(i64::from(self.fake))),
            ("feed", Value::Text(self.feed.clone())),
            ("discovered_at", Value::Text(self.discovered_at.to_rfc3339())),
        ])
    }
}

/// An article row that could not be stored, with the reason
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRecord {
    pub message: String,
    pub url: String,
    pub source: String,
    pub fake: bool,
    pub occurred_at: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(
        message: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        fake: bool,
    ) -> Self {
        Self {
            message: message.into(),
            url: url.into(),
            source: source.into(),
            fake,
            occurred_at: Utc::now(),
        }
    }

    /// Records why `article` failed to persist
    pub fn from_failure(error: &impl Display, article: &ArticleRecord) -> Self {
        Self::new(
            error.to_string(),
            article.url.clone(),
            article.source.clone(),
            article.fake,
        )
    }
}

impl SqlRecord for ErrorRecord {
    fn columns() -> &'static [&'static str] {
        &["message", "url", "source", "fake", "occurred_at"]
    }

    fn to_sql_map(&self) -> HashMap<&'static str, Value> {
        HashMap::from([
            ("message", Value::Text(self.message.clone())),
            ("url", Value::Text(self.url.clone())),
            ("source", Value::Text(self.source.clone())),
            ("fake", Value::Integer(i64::from(self.fake))),
            ("occurred_at", Value::Text(self.occurred_at.to_rfc3339())),
        ])
    }
}
