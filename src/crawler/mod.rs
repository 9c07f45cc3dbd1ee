//! Crawler module for press-release page ingestion
//!
//! This module contains the crawl side of ingestion, including:
//! - The `Fetcher` capability and its reqwest-based implementation
//! - HTML parsing into links and markdown renderings
//! - Orchestration from URL to structured crawl result
//! - Pending-status analysis of a crawl result

mod fetcher;
mod orchestrator;
mod parser;
mod pending;

pub use fetcher::{build_http_client, FetchResponse, FetchedLinks, Fetcher, HttpFetcher, RawLink};
pub use orchestrator::{
    is_attachment_url, mentions_attachment, CrawlOrchestrator, ATTACHMENT_KEYWORDS,
    ATTACHMENT_SUFFIX,
};
pub use parser::{parse_html, ParsedPage};
pub use pending::{analyze, PendingStatus};
