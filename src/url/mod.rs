//! URL handling module for Press-Ingest
//!
//! This module provides trailing-slash normalization for candidate
//! comparison, link resolution against a page URL, and internal/external
//! link classification.

mod domain;
mod normalize;

use crate::model::LinkKind;
use url::Url;

// Re-export main functions
pub use domain::extract_domain;
pub use normalize::{resolve_link, strip_trailing_slash};

/// Classifies a link as internal or external relative to the page it was found on
///
/// A link is internal when its host equals the page host (case-insensitive).
/// Links without a parseable host count as external.
///
/// # Examples
///
/// ```
/// use press_ingest::model::LinkKind;
/// use press_ingest::url::classify_link;
/// use url::Url;
///
/// let page = Url::parse("https://example.com/news/pr-1").unwrap();
/// assert_eq!(classify_link("https://example.com/ir.pdf", &page), LinkKind::Internal);
/// assert_eq!(classify_link("https://other.com/", &page), LinkKind::External);
/// ```
pub fn classify_link(link: &str, page_url: &Url) -> LinkKind {
    let page_domain = extract_domain(page_url);
    let link_domain = Url::parse(link).ok().and_then(|u| extract_domain(&u));

    match (page_domain, link_domain) {
        (Some(page), Some(link)) if page == link => LinkKind::Internal,
        _ => LinkKind::External,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://ir.example.com/releases/2024/q1").unwrap()
    }

    #[test]
    fn test_same_host_is_internal() {
        assert_eq!(
            classify_link("https://ir.example.com/files/q1.pdf", &page()),
            LinkKind::Internal
        );
    }

    #[test]
    fn test_host_comparison_ignores_case() {
        assert_eq!(
            classify_link("https://IR.Example.com/", &page()),
            LinkKind::Internal
        );
    }

    #[test]
    fn test_sibling_subdomain_is_external() {
        assert_eq!(
            classify_link("https://www.example.com/", &page()),
            LinkKind::External
        );
    }

    #[test]
    fn test_unparseable_link_is_external() {
        assert_eq!(classify_link("not a url", &page()), LinkKind::External);
    }
}
