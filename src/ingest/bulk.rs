//! Bulk ingestion over a press-release table
//!
//! Structural problems (a missing url, title or date column) fail the whole
//! batch before any row is fetched. Past that point each row produces an
//! outcome value; only storage failures abort the run.
//!
//! Rows are crawled one at a time by default. With a wider concurrency
//! limit, crawls overlap but outcomes still come back in input order.

use crate::crawler::CrawlOrchestrator;
use crate::ingest::date::parse_press_date;
use crate::ingest::link_metadata;
use crate::ingest::table::{ColumnMap, Table, PRESS_RELEASE_COLUMNS};
use crate::model::{LinkDescriptor, SelectionMethod};
use crate::config::MAX_CONCURRENT_ROWS;
use crate::storage::{canonical_ticker, DocumentStorage, NewCrawlDocument, StorageError};
use crate::ValidationError;
use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;

/// Result of one non-skipped row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    /// 1-based position of the row among the table's data rows
    pub row: usize,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    pub ok: bool,
    /// Set when the crawl was persisted; `None` for crawl-only rows
    pub stored_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A row left out of the outcomes, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

/// Everything a bulk run produced
///
/// `outcomes` corresponds 1:1, in order, with the rows that were not
/// skipped. Skipped rows appear only in `skipped`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
    pub outcomes: Vec<BulkOutcome>,
    pub skipped: Vec<SkippedRow>,
}

impl BulkReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.ok).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn stored(&self) -> usize {
        self.outcomes.iter().filter(|o| o.stored_id.is_some()).count()
    }
}

/// A row that passed the skip checks
#[derive(Debug, Clone)]
struct PendingRow {
    row: usize,
    url: String,
    ticker: Option<String>,
    title: String,
    press_ts: Option<DateTime<Utc>>,
}

impl PendingRow {
    fn outcome(&self, stored_id: Option<i64>, error: Option<String>) -> BulkOutcome {
        BulkOutcome {
            row: self.row,
            url: self.url.clone(),
            ticker: self.ticker.clone(),
            ok: error.is_none(),
            stored_id,
            error,
        }
    }
}

/// Drives a press-release table through the orchestrator into the document store
pub struct BulkRunner<'a> {
    orchestrator: &'a CrawlOrchestrator,
    documents: &'a dyn DocumentStorage,
    max_concurrent_rows: usize,
}

impl<'a> BulkRunner<'a> {
    pub fn new(orchestrator: &'a CrawlOrchestrator, documents: &'a dyn DocumentStorage) -> Self {
        Self {
            orchestrator,
            documents,
            max_concurrent_rows: 1,
        }
    }

    /// Allows up to `limit` rows in flight, clamped to `1..=MAX_CONCURRENT_ROWS`
    pub fn with_max_concurrent_rows(mut self, limit: usize) -> Self {
        let clamped = limit.clamp(1, MAX_CONCURRENT_ROWS);
        if clamped != limit {
            tracing::warn!("Concurrent rows {} out of range, using {}", limit, clamped);
        }
        self.max_concurrent_rows = clamped;
        self
    }

    /// Runs every row of `table`
    ///
    /// # Errors
    ///
    /// * `IngestError::Validation` - a required column is missing; nothing was fetched
    /// * `IngestError::Storage` - persisting a row failed; the run stops there
    pub async fn run(&self, table: &Table) -> crate::Result<BulkReport> {
        let columns = ColumnMap::resolve(&table.headers, PRESS_RELEASE_COLUMNS)?;
        let total = table.len();

        let mut pending = Vec::new();
        let mut skipped = Vec::new();
        for (i, cells) in table.rows.iter().enumerate() {
            let row = i + 1;
            let url = columns.cell(cells, "url");
            let title = columns.cell(cells, "title");

            let reason = if url.is_empty() {
                Some("empty url")
            } else if title.is_empty() {
                Some("empty title")
            } else {
                None
            };
            if let Some(reason) = reason {
                tracing::warn!("[{}/{}] skipped: {}", row, total, reason);
                skipped.push(SkippedRow {
                    row,
                    reason: reason.to_string(),
                });
                continue;
            }

            let ticker = columns.cell(cells, "ticker");
            let date = columns.cell(cells, "date");
            let press_ts = parse_press_date(date);
            if press_ts.is_none() && !date.is_empty() {
                tracing::debug!("[{}/{}] unparseable date '{}'", row, total, date);
            }

            pending.push(PendingRow {
                row,
                url: url.to_string(),
                ticker: (!ticker.is_empty()).then(|| canonical_ticker(ticker)),
                title: title.to_string(),
                press_ts,
            });
        }

        tracing::info!(
            "Bulk run: {} rows, {} to crawl, {} skipped",
            total,
            pending.len(),
            skipped.len()
        );

        let outcomes: Vec<BulkOutcome> = stream::iter(
            pending
                .into_iter()
                .map(|row| self.process_row(row, total)),
        )
        .buffered(self.max_concurrent_rows)
        .try_collect::<Vec<_>>()
        .await?;

        Ok(BulkReport { outcomes, skipped })
    }

    /// Crawls and, when possible, persists one row
    ///
    /// Fetch failures and missing dates become failed outcomes; only
    /// storage errors escape.
    async fn process_row(&self, row: PendingRow, total: usize) -> Result<BulkOutcome, StorageError> {
        let link = LinkDescriptor::single(row.url.clone(), SelectionMethod::Bulk);

        let (result, status) = match self.orchestrator.crawl_link(&link).await {
            Ok(crawled) => crawled,
            Err(e) => {
                tracing::warn!("[{}/{}] {} FAILED: {}", row.row, total, row.url, e);
                return Ok(row.outcome(None, Some(e.to_string())));
            }
        };

        if status.has_issues {
            tracing::debug!(
                "[{}/{}] {} pending: empty_content={}, no_links={}",
                row.row,
                total,
                row.url,
                status.empty_content,
                status.no_links
            );
        }

        let Some(ticker) = row.ticker.clone() else {
            tracing::info!("[{}/{}] {} -> no save", row.row, total, row.url);
            return Ok(row.outcome(None, None));
        };

        let Some(press_ts) = row.press_ts else {
            let err = ValidationError::MissingPressDate {
                url: row.url.clone(),
            };
            tracing::warn!("[{}/{}] {} FAILED: {}", row.row, total, row.url, err);
            return Ok(row.outcome(None, Some(err.to_string())));
        };

        let id = self.documents.save(NewCrawlDocument {
            ticker,
            title: row.title.clone(),
            press_release_timestamp: press_ts,
            raw_result: result,
            metadata: link_metadata(&link),
        })?;

        tracing::info!("[{}/{}] {} -> {}", row.row, total, row.url, id);
        Ok(row.outcome(Some(id), None))
    }
}
