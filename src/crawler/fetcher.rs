//! Page fetching capability
//!
//! This module defines the `Fetcher` seam the orchestrator crawls through,
//! the raw response shape a fetcher reports, and `HttpFetcher`, the default
//! implementation built on reqwest:
//! - Building HTTP clients with the configured user agent and timeouts
//! - GET requests following a bounded number of redirects
//! - Error classification into a failure signal plus diagnostic

use crate::config::FetcherConfig;
use crate::crawler::parser::parse_html;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A link as reported by a fetcher, before classification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLink {
    pub href: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub title: String,
}

impl RawLink {
    pub fn new(href: impl Into<String>, text: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
            title: title.into(),
        }
    }
}

/// Links found on a fetched page, split by whether they stay on the site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedLinks {
    #[serde(default)]
    pub internal: Vec<RawLink>,
    #[serde(default)]
    pub external: Vec<RawLink>,
}

/// Raw response of a fetcher for one URL
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResponse {
    /// Explicit success signal; false means network, HTTP or render failure
    pub success: bool,

    /// Final URL after redirects
    pub final_url: String,

    /// Diagnostic for a failed fetch
    pub error_message: Option<String>,

    /// Markdown rendering of the whole page
    pub raw_markdown: String,

    /// Markdown rendering of the main content only, when the fetcher could isolate it
    pub filtered_markdown: Option<String>,

    pub links: FetchedLinks,
}

impl FetchResponse {
    /// A failed fetch with the given diagnostic
    pub fn failure(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            final_url: url.into(),
            error_message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Capability that retrieves and renders a web page
///
/// Implementations report failure through `FetchResponse::success` rather
/// than returning an error, and never retry on the caller's behalf.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResponse;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Fetches a URL and renders it
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | HTTP 2xx with HTML (or no Content-Type) | success |
    /// | HTTP non-2xx | failure, `HTTP <code>` |
    /// | Non-HTML Content-Type | failure, `Expected HTML, got <type>` |
    /// | Timeout | failure, `Request timeout` |
    /// | Connection refused | failure, `Connection refused` |
    /// | Redirect chain over the limit | failure, reqwest diagnostic |
    async fn fetch(&self, url: &str) -> FetchResponse {
        tracing::debug!("Fetching {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let message = if e.is_timeout() {
                    "Request timeout".to_string()
                } else if e.is_connect() {
                    "Connection refused".to_string()
                } else {
                    e.to_string()
                };
                return FetchResponse::failure(url, message);
            }
        };

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return FetchResponse::failure(final_url.as_str(), format!("HTTP {}", status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty()
            && !content_type.contains("text/html")
            && !content_type.contains("application/xhtml+xml")
        {
            return FetchResponse::failure(
                final_url.as_str(),
                format!("Expected HTML, got {}", content_type),
            );
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return FetchResponse::failure(final_url.as_str(), e.to_string()),
        };

        let page = parse_html(&body, &final_url);

        FetchResponse {
            success: true,
            final_url: final_url.to_string(),
            error_message: None,
            raw_markdown: page.raw_markdown,
            filtered_markdown: page.filtered_markdown,
            links: page.links,
        }
    }
}
