use crate::model::PageLink;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured outcome of crawling one page
///
/// The two attachment subsets are derived independently from `all_links`
/// and may overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// URL reported by the fetcher after redirects
    pub source_url: String,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,

    /// Full-page markdown rendering
    #[serde(default)]
    pub markdown_content: String,

    /// Filtered ("fit") markdown rendering of the main content
    #[serde(default)]
    pub main_content: String,

    /// Every link found on the page, internal links first
    #[serde(default)]
    pub all_links: Vec<PageLink>,

    /// Links whose URL ends in `.pdf`
    #[serde(default)]
    pub attachment_links_by_url: Vec<PageLink>,

    /// Links whose text or title mentions a download keyword
    #[serde(default)]
    pub attachment_links_by_text: Vec<PageLink>,
}

impl CrawlResult {
    /// An empty result for the given URL, fetched now
    pub fn empty(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            fetched_at: Utc::now(),
            markdown_content: String::new(),
            main_content: String::new(),
            all_links: Vec::new(),
            attachment_links_by_url: Vec::new(),
            attachment_links_by_text: Vec::new(),
        }
    }
}
