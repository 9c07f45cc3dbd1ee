//! Console summaries

use crate::ingest::{BulkReport, CrawlReport};
use crate::storage::{CompanyRecord, StoredCrawlDocument};

/// Prints a bulk run summary to stdout
pub fn print_bulk_summary(report: &BulkReport) {
    println!("=== Bulk Ingestion ===\n");

    for outcome in &report.outcomes {
        match (&outcome.error, outcome.stored_id) {
            (Some(error), _) => println!("  [row {}] {} FAILED: {}", outcome.row, outcome.url, error),
            (None, Some(id)) => println!("  [row {}] {} -> {}", outcome.row, outcome.url, id),
            (None, None) => println!("  [row {}] {} -> no save", outcome.row, outcome.url),
        }
    }
    for skipped in &report.skipped {
        println!("  [row {}] skipped: {}", skipped.row, skipped.reason);
    }
    println!();

    println!(
        "{} crawled, {} stored, {} failed, {} skipped",
        report.outcomes.len(),
        report.stored(),
        report.failed(),
        report.skipped.len()
    );
}

/// Prints the outcome of a single crawl
pub fn print_crawl_report(report: &CrawlReport) {
    let result = &report.crawl_result;
    println!("Crawled: {}", result.source_url);
    println!(
        "Content: {} chars, {} links",
        result.markdown_content.len(),
        result.all_links.len()
    );

    let pending = &report.pending;
    if pending.has_issues {
        println!(
            "Pending: empty_content={}, no_links={}",
            pending.empty_content, pending.no_links
        );
    }
    if !pending.attachments_to_download.is_empty() {
        println!("Attachments ({}):", pending.attachments_to_download.len());
        for link in &pending.attachments_to_download {
            println!("  - {}", link.url);
        }
    }
    if !pending.candidate_urls_not_crawled.is_empty() {
        println!("Candidates not crawled:");
        for url in &pending.candidate_urls_not_crawled {
            println!("  - {}", url);
        }
    }
    if let Some(id) = report.stored_id {
        println!("Stored as document {}", id);
    }
}

/// Prints a table of companies, sorted by ticker
pub fn print_companies(companies: &[CompanyRecord]) {
    let mut sorted: Vec<_> = companies.iter().collect();
    sorted.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    println!("{:<10} {:<40} {}", "TICKER", "NAME", "SECTOR");
    for company in sorted {
        println!(
            "{:<10} {:<40} {}",
            company.ticker,
            company.name,
            company.sector.as_deref().unwrap_or("-")
        );
    }
}

/// Prints one line per listed document
pub fn print_documents(documents: &[StoredCrawlDocument]) {
    for doc in documents {
        println!(
            "{:>6}  {}  {:<8} {}{}",
            doc.id,
            doc.press_release_timestamp.format("%Y-%m-%d"),
            doc.ticker,
            doc.title,
            if doc.unprocessed { "" } else { "  (processed)" }
        );
    }
    println!("{} documents", documents.len());
}

/// Prints a single document with its crawl result
pub fn print_document(doc: &StoredCrawlDocument) {
    println!("Document {}", doc.id);
    println!("  Ticker: {}", doc.ticker);
    println!("  Title: {}", doc.title);
    println!("  Press release: {}", doc.press_release_timestamp.to_rfc3339());
    println!("  Source: {}", doc.source_url);
    println!("  Crawled: {}", doc.crawl_timestamp.to_rfc3339());
    println!("  Unprocessed: {}", doc.unprocessed);
    if let Some(result) = &doc.raw_result {
        println!("  Links: {}", result.all_links.len());
        println!();
        println!("{}", result.main_content);
    }
}
