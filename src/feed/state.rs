//! Resumable crawl progress
//!
//! A [`CrawlState`] is the only thing that survives between runs. While a feed
//! is still going its `data` holds the URL of the next listing page and the
//! remaining page budget; once the feed is over the payload is ignored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Key of the listing page URL in [`CrawlState::data`]
pub const URL_KEY: &str = "url";

/// Key of the remaining page budget in [`CrawlState::data`] (`-1` = unbounded)
pub const PAGE_KEY: &str = "page";

/// Errors raised when a stored state cannot seed a reader
#[derive(Debug, Error)]
pub enum StateError {
    #[error("State for feed '{found}' cannot seed reader '{expected}'")]
    NameMismatch { expected: String, found: String },

    #[error("State for feed '{feed}' is missing field '{field}'")]
    MissingField { feed: String, field: &'static str },

    #[error("State for feed '{feed}' has an invalid '{field}' field: {value}")]
    InvalidField {
        feed: String,
        field: &'static str,
        value: Value,
    },

    #[error("Failed to (de)serialize state: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Outcome of seeding a reader from a stored state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// The reader now points at the stored page and budget
    Resumed,
    /// The state belongs to a finished feed; the reader was left untouched
    Declined,
}

/// How many more listing pages a reader may crawl after its current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthBound {
    Unbounded,
    Pages(u32),
}

impl DepthBound {
    /// True when no successor page may be crawled
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Pages(0))
    }

    /// Budget of the successor page; unbounded stays unbounded
    pub fn decrement(self) -> Self {
        match self {
            Self::Unbounded => Self::Unbounded,
            Self::Pages(n) => Self::Pages(n.saturating_sub(1)),
        }
    }

    /// Integer form stored under [`PAGE_KEY`]
    pub fn to_counter(self) -> i64 {
        match self {
            Self::Unbounded => -1,
            Self::Pages(n) => i64::from(n),
        }
    }

    /// Parses the integer form; anything below `-1` or above `u32::MAX` is rejected
    pub fn from_counter(counter: i64) -> Option<Self> {
        match counter {
            -1 => Some(Self::Unbounded),
            n => u32::try_from(n).ok().map(Self::Pages),
        }
    }
}

/// Serializable snapshot of one reader's progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlState {
    pub name: String,
    pub is_over: bool,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl CrawlState {
    /// Builds the state of a reader positioned at `url` with `depth` pages left
    pub fn new(name: impl Into<String>, is_over: bool, url: &str, depth: DepthBound) -> Self {
        let mut data = Map::new();
        data.insert(URL_KEY.to_string(), Value::from(url));
        data.insert(PAGE_KEY.to_string(), Value::from(depth.to_counter()));
        Self {
            name: name.into(),
            is_over,
            data,
        }
    }

    /// Listing page URL stored in the payload
    pub fn url(&self) -> Result<&str, StateError> {
        match self.data.get(URL_KEY) {
            None => Err(self.missing(URL_KEY)),
            Some(Value::String(url)) => Ok(url.as_str()),
            Some(other) => Err(self.invalid(URL_KEY, other)),
        }
    }

    /// Remaining page budget stored in the payload
    pub fn depth(&self) -> Result<DepthBound, StateError> {
        let value = self.data.get(PAGE_KEY).ok_or_else(|| self.missing(PAGE_KEY))?;
        value
            .as_i64()
            .and_then(DepthBound::from_counter)
            .ok_or_else(|| self.invalid(PAGE_KEY, value))
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(json)?)
    }

    fn missing(&self, field: &'static str) -> StateError {
        StateError::MissingField {
            feed: self.name.clone(),
            field,
        }
    }

    fn invalid(&self, field: &'static str, value: &Value) -> StateError {
        StateError::InvalidField {
            feed: self.name.clone(),
            field,
            value: value.clone(),
        }
    }
}
