//! Report files
//!
//! JSON reports carry the full structured result; the markdown summary is
//! meant for people reconciling a bulk upload against its source table.

use crate::ingest::BulkReport;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes `value` as pretty-printed JSON, creating parent directories
pub fn write_json_report<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> crate::Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.write_all(b"\n")?;

    tracing::info!("Report written to {}", output_path.display());
    Ok(())
}

/// Generates a markdown summary of a bulk run
///
/// # Arguments
///
/// * `report` - The bulk run report
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(report: &BulkReport, output_path: &Path) -> crate::Result<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a bulk run report as markdown
pub fn format_markdown_summary(report: &BulkReport) -> String {
    let mut md = String::new();

    md.push_str("# Press Release Bulk Ingestion\n\n");

    md.push_str("## Overview\n\n");
    md.push_str(&format!("- **Rows crawled**: {}\n", report.outcomes.len()));
    md.push_str(&format!("- **Succeeded**: {}\n", report.succeeded()));
    md.push_str(&format!("- **Stored**: {}\n", report.stored()));
    md.push_str(&format!("- **Failed**: {}\n", report.failed()));
    md.push_str(&format!("- **Skipped**: {}\n\n", report.skipped.len()));

    if !report.outcomes.is_empty() {
        md.push_str("## Rows\n\n");
        md.push_str("| Row | URL | Ticker | Result |\n");
        md.push_str("|-----|-----|--------|--------|\n");
        for outcome in &report.outcomes {
            let result = match (&outcome.error, outcome.stored_id) {
                (Some(error), _) => format!("failed: {}", escape_cell(error)),
                (None, Some(id)) => format!("stored #{}", id),
                (None, None) => "crawled, not stored".to_string(),
            };
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                outcome.row,
                escape_cell(&outcome.url),
                outcome.ticker.as_deref().unwrap_or("-"),
                result
            ));
        }
        md.push('\n');
    }

    if !report.skipped.is_empty() {
        md.push_str("## Skipped Rows\n\n");
        for skipped in &report.skipped {
            md.push_str(&format!("- Row {}: {}\n", skipped.row, skipped.reason));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{BulkOutcome, SkippedRow};

    fn report() -> BulkReport {
        BulkReport {
            outcomes: vec![
                BulkOutcome {
                    row: 1,
                    url: "https://a.com/1".to_string(),
                    ticker: Some("ACME".to_string()),
                    ok: true,
                    stored_id: Some(7),
                    error: None,
                },
                BulkOutcome {
                    row: 3,
                    url: "https://a.com/3".to_string(),
                    ticker: None,
                    ok: false,
                    stored_id: None,
                    error: Some("HTTP 404 | gone".to_string()),
                },
            ],
            skipped: vec![SkippedRow {
                row: 2,
                reason: "empty title".to_string(),
            }],
        }
    }

    #[test]
    fn test_format_markdown_summary() {
        let md = format_markdown_summary(&report());

        assert!(md.contains("- **Stored**: 1"));
        assert!(md.contains("- **Failed**: 1"));
        assert!(md.contains("| 1 | https://a.com/1 | ACME | stored #7 |"));
        assert!(md.contains("failed: HTTP 404 \\| gone"));
        assert!(md.contains("- Row 2: empty title"));
    }

    #[test]
    fn test_write_json_report_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("bulk.json");

        write_json_report(&report(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["outcomes"][0]["stored_id"], 7);
        assert!(value["outcomes"][0].get("error").is_none());
        assert_eq!(value["skipped"][0]["row"], 2);
    }
}
