//! Pending-status analysis
//!
//! Derives the work still outstanding after a crawl: empty content, a page
//! without links, attachments to download, and candidate URLs that were
//! never crawled. Pure and deterministic.

use crate::model::{CrawlResult, LinkDescriptor, PageLink};
use crate::url::strip_trailing_slash;
use serde::Serialize;
use std::collections::HashMap;

/// What remains to be done after a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PendingStatus {
    /// Both the full and the filtered content are empty
    pub empty_content: bool,

    /// The page had no links at all
    pub no_links: bool,

    /// Attachment links deduplicated by URL
    pub attachments_to_download: Vec<PageLink>,

    /// Candidate URLs that differ from the crawled URL
    pub candidate_urls_not_crawled: Vec<String>,

    /// `empty_content || no_links`
    pub has_issues: bool,
}

/// Analyzes a crawl result against the link descriptor that produced it
///
/// Every rule is evaluated independently; this never fails.
pub fn analyze(link: &LinkDescriptor, result: &CrawlResult) -> PendingStatus {
    let empty_content = result.markdown_content.is_empty() && result.main_content.is_empty();
    let no_links = result.all_links.is_empty();

    PendingStatus {
        empty_content,
        no_links,
        attachments_to_download: merge_by_url(
            &result.attachment_links_by_url,
            &result.attachment_links_by_text,
        ),
        candidate_urls_not_crawled: uncrawled_candidates(link.candidates(), &result.source_url),
        has_issues: empty_content || no_links,
    }
}

/// Unions two link lists keyed by URL
///
/// Entries keep the position of the first occurrence of their URL; the
/// value is the last one seen, scanning `first` then `second`.
fn merge_by_url(first: &[PageLink], second: &[PageLink]) -> Vec<PageLink> {
    let mut merged: Vec<PageLink> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for link in first.iter().chain(second) {
        match positions.get(link.url.as_str()) {
            Some(&index) => merged[index] = link.clone(),
            None => {
                positions.insert(link.url.as_str(), merged.len());
                merged.push(link.clone());
            }
        }
    }

    merged
}

fn uncrawled_candidates(candidates: &[String], crawled_url: &str) -> Vec<String> {
    let crawled = strip_trailing_slash(crawled_url);
    candidates
        .iter()
        .filter(|c| strip_trailing_slash(c) != crawled)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinkKind, SelectionMethod};

    fn link(url: &str, text: &str) -> PageLink {
        PageLink::new(url, text, "", LinkKind::Internal)
    }

    fn descriptor(candidates: &[&str]) -> LinkDescriptor {
        LinkDescriptor::new(
            "http://x.com/a",
            SelectionMethod::Auto,
            candidates.iter().map(|c| c.to_string()).collect(),
            None,
        )
    }

    #[test]
    fn test_empty_content_with_links() {
        let mut result = CrawlResult::empty("http://x.com/a");
        result.all_links = vec![link("http://x.com/b", "B")];

        let status = analyze(&descriptor(&[]), &result);
        assert!(status.empty_content);
        assert!(!status.no_links);
        assert!(status.has_issues);
    }

    #[test]
    fn test_minimal_result() {
        let status = analyze(&descriptor(&[]), &CrawlResult::empty("http://x.com/a"));
        assert!(status.empty_content);
        assert!(status.no_links);
        assert!(status.has_issues);
        assert!(status.attachments_to_download.is_empty());
        assert!(status.candidate_urls_not_crawled.is_empty());
    }

    #[test]
    fn test_content_in_either_rendering_is_enough() {
        let mut result = CrawlResult::empty("http://x.com/a");
        result.main_content = "body".to_string();
        result.all_links = vec![link("http://x.com/b", "B")];

        let status = analyze(&descriptor(&[]), &result);
        assert!(!status.empty_content);
        assert!(!status.has_issues);
    }

    #[test]
    fn test_distinct_attachments_both_kept() {
        let mut result = CrawlResult::empty("http://x.com/a");
        result.attachment_links_by_url = vec![link("http://x.com/q1.pdf", "Q1")];
        result.attachment_links_by_text = vec![link("http://x.com/deck", "Download")];

        let status = analyze(&descriptor(&[]), &result);
        assert_eq!(status.attachments_to_download.len(), 2);
    }

    #[test]
    fn test_same_url_attachment_deduplicated_last_wins() {
        let mut result = CrawlResult::empty("http://x.com/a");
        result.attachment_links_by_url = vec![link("http://x.com/q1.pdf", "Q1")];
        result.attachment_links_by_text = vec![link("http://x.com/q1.pdf", "Download PDF")];

        let status = analyze(&descriptor(&[]), &result);
        assert_eq!(status.attachments_to_download.len(), 1);
        assert_eq!(status.attachments_to_download[0].text, "Download PDF");
    }

    #[test]
    fn test_candidates_compared_without_trailing_slash() {
        let result = CrawlResult::empty("http://x.com/a");
        let status = analyze(&descriptor(&["http://x.com/a/", "http://x.com/b"]), &result);
        assert_eq!(status.candidate_urls_not_crawled, vec!["http://x.com/b"]);
    }

    #[test]
    fn test_candidate_order_preserved() {
        let result = CrawlResult::empty("http://x.com/a/");
        let status = analyze(
            &descriptor(&["http://x.com/c", "http://x.com/a", "http://x.com/b/"]),
            &result,
        );
        assert_eq!(
            status.candidate_urls_not_crawled,
            vec!["http://x.com/c", "http://x.com/b/"]
        );
    }
}
