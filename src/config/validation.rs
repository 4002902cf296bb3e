use crate::config::types::{Config, CrawlerConfig, FeedEntry, StorageConfig};
use crate::ConfigError;
use scraper::Selector;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_storage_config(&config.storage)?;
    validate_crawler_config(&config.crawler)?;
    validate_feeds(&config.feeds)?;
    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.pool_size < 1 || config.pool_size > 64 {
        return Err(ConfigError::Validation(format!(
            "pool_size must be between 1 and 64, got {}",
            config.pool_size
        )));
    }

    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // Kept small on purpose: entry pages all live on the feed's own site
    if config.link_workers < 1 || config.link_workers > 8 {
        return Err(ConfigError::Validation(format!(
            "link_workers must be between 1 and 8, got {}",
            config.link_workers
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_feeds(feeds: &[FeedEntry]) -> Result<(), ConfigError> {
    if feeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[feed]] must be configured".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for feed in feeds {
        if feed.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "feed name cannot be empty".to_string(),
            ));
        }

        if !names.insert(feed.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate feed name '{}'",
                feed.name
            )));
        }

        let url = Url::parse(&feed.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid URL for feed '{}': {}", feed.name, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Feed '{}' must use http or https, got '{}'",
                feed.name,
                url.scheme()
            )));
        }

        for (label, selector) in [
            ("next", &feed.selectors.next),
            ("entries", &feed.selectors.entries),
            ("links", &feed.selectors.links),
        ] {
            validate_selector(&feed.name, label, selector)?;
        }
    }

    Ok(())
}

fn validate_selector(feed: &str, label: &str, selector: &str) -> Result<(), ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector(format!(
            "feed '{}': {} selector cannot be empty",
            feed, label
        )));
    }

    Selector::parse(selector).map_err(|e| {
        ConfigError::InvalidSelector(format!(
            "feed '{}': {} selector '{}' does not parse: {:?}",
            feed, label, selector, e
        ))
    })?;

    Ok(())
}
