use serde::{Deserialize, Serialize};
use std::fmt;

/// How a press-release URL was chosen for crawling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    /// Submitted through a user interface
    Ui,
    /// Given on the command line
    Cli,
    /// Read from a bulk tabular upload
    Bulk,
    /// Picked by an automated link selector
    Auto,
}

impl SelectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ui => "ui",
            Self::Cli => "cli",
            Self::Bulk => "bulk",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A press-release URL to crawl together with the alternates considered for it
///
/// Immutable once constructed; fields are only readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkDescriptor {
    url: String,
    selection_method: SelectionMethod,
    candidates: Vec<String>,
    score: Option<f64>,
}

impl LinkDescriptor {
    pub fn new(
        url: impl Into<String>,
        selection_method: SelectionMethod,
        candidates: Vec<String>,
        score: Option<f64>,
    ) -> Self {
        Self {
            url: url.into(),
            selection_method,
            candidates,
            score,
        }
    }

    /// Builds a descriptor whose only candidate is the URL itself
    ///
    /// This is how single and bulk ingestion describe the URLs they are given.
    pub fn single(url: impl Into<String>, selection_method: SelectionMethod) -> Self {
        let url = url.into();
        Self::new(url.clone(), selection_method, vec![url], None)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn selection_method(&self) -> SelectionMethod {
        self.selection_method
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }
}

/// Whether a link stays on the crawled site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Internal,
    External,
}

/// An anchor found on a crawled page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageLink {
    pub url: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub title: String,
    pub kind: LinkKind,
}

impl PageLink {
    pub fn new(
        url: impl Into<String>,
        text: impl Into<String>,
        title: impl Into<String>,
        kind: LinkKind,
    ) -> Self {
        Self {
            url: url.into(),
            text: text.into(),
            title: title.into(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_descriptor_lists_itself_as_candidate() {
        let link = LinkDescriptor::single("https://example.com/pr", SelectionMethod::Bulk);
        assert_eq!(link.url(), "https://example.com/pr");
        assert_eq!(link.candidates(), &["https://example.com/pr".to_string()]);
        assert_eq!(link.selection_method(), SelectionMethod::Bulk);
        assert_eq!(link.score(), None);
    }

    #[test]
    fn test_selection_method_serializes_lowercase() {
        let json = serde_json::to_string(&SelectionMethod::Ui).unwrap();
        assert_eq!(json, "\"ui\"");
        assert_eq!(SelectionMethod::Cli.to_string(), "cli");
    }
}
