//! Crawl document store
//!
//! Append-only: every save inserts a new row flagged unprocessed. Nothing
//! here updates, deduplicates or clears the flag.

use crate::storage::pool::ConnectionPool;
use crate::storage::schema::Collection;
use crate::storage::traits::{DocumentStorage, StorageResult};
use crate::storage::{
    canonical_ticker, format_timestamp, parse_timestamp, NewCrawlDocument, StoredCrawlDocument,
};
use rusqlite::{params, OptionalExtension, Row};
use std::sync::Arc;

/// SQLite-backed store of crawl documents
#[derive(Clone)]
pub struct DocumentStore {
    pool: Arc<ConnectionPool>,
}

/// Column values as read from SQLite, before decoding
struct DocumentRow {
    id: i64,
    ticker: String,
    title: String,
    press_release_timestamp: String,
    source_url: String,
    crawl_timestamp: String,
    raw_result: Option<String>,
    metadata: String,
    unprocessed: bool,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>, with_raw: bool) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            ticker: row.get(1)?,
            title: row.get(2)?,
            press_release_timestamp: row.get(3)?,
            source_url: row.get(4)?,
            crawl_timestamp: row.get(5)?,
            metadata: row.get(6)?,
            unprocessed: row.get(7)?,
            raw_result: if with_raw { row.get(8)? } else { None },
        })
    }

    fn decode(self) -> StorageResult<StoredCrawlDocument> {
        Ok(StoredCrawlDocument {
            id: self.id,
            ticker: self.ticker,
            title: self.title,
            press_release_timestamp: parse_timestamp(&self.press_release_timestamp)?,
            source_url: self.source_url,
            crawl_timestamp: parse_timestamp(&self.crawl_timestamp)?,
            raw_result: self
                .raw_result
                .as_deref()
                .map(serde_json::from_str)
                .transpose()?,
            metadata: serde_json::from_str(&self.metadata)?,
            unprocessed: self.unprocessed,
        })
    }
}

const SELECT_COLUMNS: &str = "id, ticker, title, press_release_timestamp, source_url,
     crawl_timestamp, metadata, unprocessed";

impl DocumentStore {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

impl DocumentStorage for DocumentStore {
    fn save(&self, doc: NewCrawlDocument) -> StorageResult<i64> {
        let raw_result = serde_json::to_string(&doc.raw_result)?;
        let metadata = serde_json::to_string(&doc.metadata)?;
        let ticker = canonical_ticker(&doc.ticker);

        let id = self.pool.with_collection(Collection::CrawlResults, |conn| {
            conn.execute(
                "INSERT INTO crawl_results (ticker, title, press_release_timestamp, source_url,
                 crawl_timestamp, raw_result, metadata, unprocessed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1)",
                params![
                    ticker,
                    doc.title,
                    format_timestamp(&doc.press_release_timestamp),
                    doc.raw_result.source_url,
                    format_timestamp(&doc.raw_result.fetched_at),
                    raw_result,
                    metadata,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        tracing::debug!("Saved crawl document {} for {}", id, ticker);
        Ok(id)
    }

    fn list_by_ticker(&self, ticker: &str) -> StorageResult<Vec<StoredCrawlDocument>> {
        let ticker = canonical_ticker(ticker);

        let rows = self.pool.with_collection(Collection::CrawlResults, |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM crawl_results WHERE ticker = ?1
                 ORDER BY press_release_timestamp DESC, id DESC",
                SELECT_COLUMNS
            ))?;
            let rows = stmt
                .query_map(params![ticker], |row| DocumentRow::from_row(row, false))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter().map(DocumentRow::decode).collect()
    }

    fn get_by_id(&self, id: i64) -> StorageResult<Option<StoredCrawlDocument>> {
        let row = self.pool.with_collection(Collection::CrawlResults, |conn| {
            let row = conn
                .query_row(
                    &format!(
                        "SELECT {}, raw_result FROM crawl_results WHERE id = ?1",
                        SELECT_COLUMNS
                    ),
                    params![id],
                    |row| DocumentRow::from_row(row, true),
                )
                .optional()?;
            Ok(row)
        })?;

        row.map(DocumentRow::decode).transpose()
    }
}
