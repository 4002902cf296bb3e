//! Evenflow: a resumable feed crawler with a durable delivery pipeline
//!
//! This crate walks paginated web feeds page by page, harvests article links,
//! checkpoints progress after every page, and persists the harvest into SQLite
//! through queue-driven consumers that isolate per-row failures into an error table.

pub mod config;
pub mod feed;
pub mod fetch;
pub mod pipeline;
pub mod runner;
pub mod storage;

use thiserror::Error;

/// Main error type for Evenflow operations
#[derive(Debug, Error)]
pub enum EvenflowError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] fetch::FetchError),

    #[error("Crawl state error: {0}")]
    State(#[from] feed::StateError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Delivery queue closed while feed {feed} was running")]
    QueueClosed { feed: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Evenflow operations
pub type Result<T> = std::result::Result<T, EvenflowError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use feed::{CrawlState, CrawlStepResult, FeedReader, HtmlFeedReader, Selectors};
pub use fetch::{HttpPageFetcher, PageFetcher};
pub use pipeline::{store_articles, store_errors, PipelineCounters};
pub use runner::{run_crawl, RunReport};
pub use storage::{ArticleRecord, ConnectionPool, ErrorRecord};
