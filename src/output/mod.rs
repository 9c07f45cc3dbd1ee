//! Output module for run reports and console summaries
//!
//! This module handles:
//! - Writing JSON reports of crawls and bulk runs
//! - Generating markdown summaries of bulk runs
//! - Printing human-readable summaries to stdout

mod report;
mod summary;

pub use report::{format_markdown_summary, generate_markdown_summary, write_json_report};
pub use summary::{
    print_bulk_summary, print_companies, print_crawl_report, print_document, print_documents,
};
