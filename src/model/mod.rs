//! Data model for press-release ingestion
//!
//! This module defines the values that flow through the ingestion core:
//! - Link descriptors (what to crawl, and why)
//! - Page links (classified anchors found on a crawled page)
//! - Crawl results (the structured outcome of one fetch)

mod link;
mod result;

pub use link::{LinkDescriptor, LinkKind, PageLink, SelectionMethod};
pub use result::CrawlResult;
