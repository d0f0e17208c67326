//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the crawler's user agent string
//! - GET requests following redirects
//! - Classifying failures into connectivity and other HTTP errors

use crate::config::UserAgentConfig;
use crate::CrawlError;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

/// Maximum redirect hops followed for one request
const MAX_REDIRECTS: usize = 10;

/// A fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status code of the final response
    pub status: u16,
    pub body: String,
    /// URL of the final response, after redirects
    pub final_url: String,
}

impl FetchedPage {
    /// Returns true for 2xx responses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Source of page content
///
/// Non-2xx responses are pages, not errors; errors mean no response was
/// received at all.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> crate::Result<FetchedPage>;
}

/// Formats the user agent string: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use userscript_crawler::config::UserAgentConfig;
/// use userscript_crawler::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "ScriptBot".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Splits request failures into "forum unreachable" and everything else
fn classify(url: &str, source: reqwest::Error) -> CrawlError {
    if source.is_connect() || source.is_timeout() {
        CrawlError::Connectivity {
            url: url.to_string(),
            source,
        }
    } else {
        CrawlError::Http {
            url: url.to_string(),
            source,
        }
    }
}

/// Production fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &UserAgentConfig) -> crate::Result<Self> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> crate::Result<FetchedPage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await.map_err(|e| classify(url, e))?;

        Ok(FetchedPage {
            status,
            body,
            final_url,
        })
    }
}
