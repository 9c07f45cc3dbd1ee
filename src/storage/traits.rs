//! Storage traits and error types
//!
//! This module defines the trait interfaces for the document and company
//! stores and the error type shared by every storage backend.

use crate::storage::{CompanyRecord, NewCrawlDocument, StoredCrawlDocument};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// These are operational failures; the ingestion core never recovers from
/// them and lets them propagate to the caller.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid stored timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Connection pool lock poisoned")]
    LockPoisoned,

    #[error("Checkpoint not found: {0}")]
    CheckpointNotFound(String),

    #[error("Snapshot column '{column}' does not exist in table {table}")]
    UnknownColumn { table: String, column: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only persistence of crawl documents
pub trait DocumentStorage: Send + Sync {
    /// Inserts a new document, always flagged unprocessed
    ///
    /// Never collapses duplicates: saving the same source URL, ticker and
    /// date twice yields two documents.
    ///
    /// # Returns
    ///
    /// The ID of the newly created document
    fn save(&self, doc: NewCrawlDocument) -> StorageResult<i64>;

    /// Lists a ticker's documents, newest press-release date first
    ///
    /// The raw crawl result is omitted from listed documents.
    fn list_by_ticker(&self, ticker: &str) -> StorageResult<Vec<StoredCrawlDocument>>;

    /// Gets a document by ID, including its raw crawl result
    fn get_by_id(&self, id: i64) -> StorageResult<Option<StoredCrawlDocument>>;
}

/// Upsert-keyed registry of covered companies
pub trait CompanyStorage: Send + Sync {
    /// Inserts or fully overwrites the company with this canonical ticker
    ///
    /// # Returns
    ///
    /// The canonical (uppercased) ticker
    fn add(
        &self,
        ticker: &str,
        name: &str,
        sector: Option<&str>,
        metadata: Map<String, Value>,
    ) -> StorageResult<String>;

    /// Gets a company by ticker (any case)
    fn get(&self, ticker: &str) -> StorageResult<Option<CompanyRecord>>;

    /// Lists every company, in no particular order
    fn list_all(&self) -> StorageResult<Vec<CompanyRecord>>;
}
