//! Configuration module for Evenflow
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use evenflow::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("evenflow.toml")).unwrap();
//! println!("Crawling {} feeds", config.feeds.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FeedEntry, StorageConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
