//! HTML parser for extracting links and markdown renderings
//!
//! This module handles parsing fetched HTML content to extract:
//! - Links with their anchor text and title, split internal/external
//! - A markdown rendering of the whole document
//! - A markdown rendering of the main content region, when one exists

use crate::crawler::fetcher::{FetchedLinks, RawLink};
use crate::model::LinkKind;
use crate::url::{classify_link, resolve_link};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Selectors tried in order to isolate the main content region
const MAIN_CONTENT_SELECTORS: &[&str] = &["article", "main", "[role='main']"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Links found on the page (absolute URLs)
    pub links: FetchedLinks,

    /// Markdown rendering of the whole document
    pub raw_markdown: String,

    /// Markdown rendering of the main content region
    pub filtered_markdown: Option<String>,
}

/// Parses HTML content and extracts links and markdown
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document, including `download` anchors
///
/// **Exclude:**
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only anchors
///
/// # Example
///
/// ```
/// use press_ingest::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><body><a href="/q1.pdf" title="Q1">Download</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/pr").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.links.internal[0].href, "https://example.com/q1.pdf");
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        links: extract_links(&document, base_url),
        raw_markdown: html2md::parse_html(html).trim().to_string(),
        filtered_markdown: extract_main_markdown(&document),
    }
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> FetchedLinks {
    let mut links = FetchedLinks::default();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(absolute_url) = resolve_link(href, base_url) else {
            continue;
        };

        let link = RawLink {
            text: collapse_whitespace(&element.text().collect::<String>()),
            title: element.value().attr("title").unwrap_or("").trim().to_string(),
            href: absolute_url,
        };

        match classify_link(&link.href, base_url) {
            LinkKind::Internal => links.internal.push(link),
            LinkKind::External => links.external.push(link),
        }
    }

    links
}

/// Renders the first main-content region as markdown
///
/// Returns None when no region matches or the region renders empty.
fn extract_main_markdown(document: &Html) -> Option<String> {
    MAIN_CONTENT_SELECTORS
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .find_map(|selector| document.select(&selector).next())
        .map(|element: ElementRef| html2md::parse_html(&element.html()).trim().to_string())
        .filter(|markdown| !markdown.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
