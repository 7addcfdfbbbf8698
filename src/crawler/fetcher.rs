//! HTTP fetcher
//!
//! A single GET per page with the configured identity headers and a
//! 10-second total timeout. The fetcher also reports the page's
//! site-relative outbound links so callers never re-download a page to
//! discover them.

use crate::config::FetchConfig;
use crate::crawler::parser::extract_relative_links;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Total request timeout
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure fetching a single page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected status {code} for {url}")]
    Status { url: String, code: u16 },
}

/// Result of a successful fetch
#[derive(Debug)]
pub struct FetchedPage {
    /// HTTP status code
    pub code: u16,
    /// Raw HTML body
    pub html: String,
    /// Distinct `/`-prefixed hrefs, in document order
    pub links: Vec<String>,
}

/// HTTP client wrapper applying the configured fetch identity
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Builds a fetcher with the configured user-agent and referrer
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&config.referrer) {
            headers.insert(REFERER, value);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(FETCH_TIMEOUT)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// Performs a single GET
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - 2xx response with body and outbound links
    /// * `Err(FetchError)` - network failure, timeout, or non-success status
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let code = response.status().as_u16();
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                code,
            });
        }

        let html = response.text().await.map_err(|e| classify(url, e))?;
        let links = extract_relative_links(&html);

        Ok(FetchedPage { code, html, links })
    }
}

fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
