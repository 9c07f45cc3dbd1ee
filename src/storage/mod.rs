//! Storage module for persisting ingestion data
//!
//! This module handles all database operations for ingestion, including:
//! - A shared, lazily connected SQLite pool
//! - Collection schemas and idempotent index provisioning
//! - The append-only crawl document store
//! - The upsert-keyed company registry
//! - Named JSON checkpoints of both collections

mod checkpoint;
mod companies;
mod documents;
mod pool;
mod schema;
mod traits;

pub use checkpoint::Checkpoints;
pub use companies::CompanyStore;
pub use documents::DocumentStore;
pub use pool::ConnectionPool;
pub use schema::{provision_collection, Collection, IndexSpec};
pub use traits::{CompanyStorage, DocumentStorage, StorageError, StorageResult};

use crate::model::CrawlResult;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A crawl document ready to be persisted
///
/// `source_url` and `crawl_timestamp` are taken from the raw result.
#[derive(Debug, Clone)]
pub struct NewCrawlDocument {
    pub ticker: String,
    pub title: String,
    /// Effective date of the press release; never defaulted to fetch time
    pub press_release_timestamp: DateTime<Utc>,
    pub raw_result: CrawlResult,
    pub metadata: Map<String, Value>,
}

/// A persisted crawl document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCrawlDocument {
    pub id: i64,
    pub ticker: String,
    pub title: String,
    pub press_release_timestamp: DateTime<Utc>,
    pub source_url: String,
    pub crawl_timestamp: DateTime<Utc>,
    /// Omitted when documents are listed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_result: Option<CrawlResult>,
    pub metadata: Map<String, Value>,
    /// Awaiting downstream processing; always true at creation
    pub unprocessed: bool,
}

/// A registered company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub ticker: String,
    pub name: String,
    pub sector: Option<String>,
    pub metadata: Map<String, Value>,
}

/// Canonical form of a ticker: trimmed and uppercased
pub fn canonical_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Formats a timestamp for storage
///
/// Fixed-width UTC RFC 3339, so lexicographic order matches time order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parses a stored timestamp
pub(crate) fn parse_timestamp(value: &str) -> StorageResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidTimestamp(format!("{}: {}", value, e)))
}
