//! Crawl orchestration - turns a fetch into a structured crawl result
//!
//! The orchestrator delegates raw retrieval to a `Fetcher`, then:
//! - Converts the fetcher's link lists into classified page links
//! - Falls back to the full markdown when no filtered rendering exists
//! - Derives the attachment subsets by URL suffix and by keyword

use crate::crawler::fetcher::{FetchResponse, Fetcher, RawLink};
use crate::crawler::pending::{analyze, PendingStatus};
use crate::model::{CrawlResult, LinkDescriptor, LinkKind, PageLink};
use crate::FetchError;
use chrono::Utc;
use std::sync::Arc;

/// URL suffix marking a link as a downloadable attachment
pub const ATTACHMENT_SUFFIX: &str = ".pdf";

/// Keywords in link text or title that mark a download intent
pub const ATTACHMENT_KEYWORDS: &[&str] = &["pdf", "download"];

/// Drives single-page crawls through a fetcher
#[derive(Clone)]
pub struct CrawlOrchestrator {
    fetcher: Arc<dyn Fetcher>,
}

impl CrawlOrchestrator {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetches a URL and builds its crawl result
    ///
    /// No retry and no fallback is attempted: a failure reported by the
    /// fetcher becomes `FetchError::Failed` with the fetcher's diagnostic.
    ///
    /// # Errors
    ///
    /// * `FetchError::EmptyUrl` - `url` is empty
    /// * `FetchError::Failed` - the fetcher reported failure
    pub async fn fetch(&self, url: &str) -> Result<CrawlResult, FetchError> {
        if url.trim().is_empty() {
            return Err(FetchError::EmptyUrl);
        }

        tracing::info!("Crawling press release at {}", url);
        let response = self.fetcher.fetch(url).await;

        if !response.success {
            let message = response
                .error_message
                .unwrap_or_else(|| "fetcher reported failure without a message".to_string());
            tracing::warn!("Crawl failed for {}: {}", url, message);
            return Err(FetchError::Failed {
                url: url.to_string(),
                message,
            });
        }

        let result = build_crawl_result(response);
        tracing::info!(
            "Crawled {}: {} chars, {} links",
            result.source_url,
            result.markdown_content.len(),
            result.all_links.len()
        );
        Ok(result)
    }

    /// Crawls a link descriptor's URL and derives its pending status
    pub async fn crawl_link(
        &self,
        link: &LinkDescriptor,
    ) -> Result<(CrawlResult, PendingStatus), FetchError> {
        let result = self.fetch(link.url()).await?;
        let status = analyze(link, &result);
        Ok((result, status))
    }
}

/// Converts a successful fetcher response into a crawl result
fn build_crawl_result(response: FetchResponse) -> CrawlResult {
    let FetchResponse {
        final_url,
        raw_markdown,
        filtered_markdown,
        links,
        ..
    } = response;

    let all_links: Vec<PageLink> = links
        .internal
        .into_iter()
        .map(|l| to_page_link(l, LinkKind::Internal))
        .chain(
            links
                .external
                .into_iter()
                .map(|l| to_page_link(l, LinkKind::External)),
        )
        .collect();

    let attachment_links_by_url = all_links
        .iter()
        .filter(|l| is_attachment_url(&l.url))
        .cloned()
        .collect();

    let attachment_links_by_text = all_links
        .iter()
        .filter(|l| mentions_attachment(&l.text) || mentions_attachment(&l.title))
        .cloned()
        .collect();

    let main_content = filtered_markdown.unwrap_or_else(|| raw_markdown.clone());

    CrawlResult {
        source_url: final_url,
        fetched_at: Utc::now(),
        markdown_content: raw_markdown,
        main_content,
        all_links,
        attachment_links_by_url,
        attachment_links_by_text,
    }
}

fn to_page_link(link: RawLink, kind: LinkKind) -> PageLink {
    PageLink {
        url: link.href,
        text: link.text,
        title: link.title,
        kind,
    }
}

/// True when the URL, case-folded, ends with `.pdf`
pub fn is_attachment_url(url: &str) -> bool {
    url.to_lowercase().ends_with(ATTACHMENT_SUFFIX)
}

/// True when the text, case-folded, contains a download keyword
pub fn mentions_attachment(text: &str) -> bool {
    let lowered = text.to_lowercase();
    ATTACHMENT_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}
