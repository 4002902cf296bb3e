//! HTTP page fetcher
//!
//! Downloads a page with reqwest and answers selector queries with scraper.
//! The client is handed in by the caller so every feed shares one connection
//! pool and one user agent.

use crate::config::CrawlerConfig;
use crate::fetch::extract::extract_hrefs;
use crate::fetch::{FetchError, FetchResult, PageFetcher};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Builds the HTTP client used for every page request
///
/// # Example
///
/// ```no_run
/// use evenflow::config::CrawlerConfig;
/// use evenflow::fetch::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`PageFetcher`] backed by a reqwest [`Client`]
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Downloads a page, returning its body and the URL it was served from
    async fn fetch_document(&self, url: &str) -> FetchResult<(String, Url)> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Relative links resolve against the post-redirect location
        let final_url = response.url().clone();
        let body = response.text().await.map_err(|source| FetchError::Http {
            url: url.to_string(),
            source,
        })?;

        tracing::trace!("Fetched {} ({} bytes)", final_url, body.len());
        Ok((body, final_url))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_many(&self, url: &str, selector: &str) -> FetchResult<Vec<String>> {
        let (body, base) = self.fetch_document(url).await?;
        extract_hrefs(&body, &base, selector)
    }

    async fn fetch_one(&self, url: &str, selector: &str) -> FetchResult<Option<String>> {
        let (body, base) = self.fetch_document(url).await?;
        Ok(extract_hrefs(&body, &base, selector)?.into_iter().next())
    }

    async fn fetch_listing(
        &self,
        url: &str,
        entries: &str,
        next: &str,
    ) -> FetchResult<(Vec<String>, Option<String>)> {
        let (body, base) = self.fetch_document(url).await?;
        let entry_links = extract_hrefs(&body, &base, entries)?;
        let next_page = extract_hrefs(&body, &base, next)?.into_iter().next();
        Ok((entry_links, next_page))
    }
}
