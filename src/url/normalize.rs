use url::Url;

/// Strips a single trailing `/` from a URL string
///
/// Candidate URLs are compared against the crawled URL in this form, so
/// `https://x.com/a/` and `https://x.com/a` are considered the same page.
/// Only one slash is removed.
///
/// # Examples
///
/// ```
/// use press_ingest::url::strip_trailing_slash;
///
/// assert_eq!(strip_trailing_slash("http://x.com/a/"), "http://x.com/a");
/// assert_eq!(strip_trailing_slash("http://x.com/a//"), "http://x.com/a/");
/// assert_eq!(strip_trailing_slash("http://x.com/a"), "http://x.com/a");
/// ```
pub fn strip_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// Resolves a link href to an absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - fragment-only anchors
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        _ => None,
    }
}
