//! Press-Ingest: press-release ingestion into a document store
//!
//! This crate turns press-release URLs into structured crawl results,
//! derives the work still pending for each crawl, drives bulk ingestion from
//! tabular input, and persists append-only crawl documents alongside an
//! upsert-keyed company registry.

pub mod config;
pub mod crawler;
pub mod ingest;
pub mod model;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Press-Ingest operations
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single page crawl
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Crawl URL must not be empty")]
    EmptyUrl,

    #[error("Crawl failed for {url}: {message}")]
    Failed { url: String, message: String },
}

/// Input validation errors, structural (batch-fatal) or per row
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Input must have a '{field}' column (accepted names: {})", .aliases.join(", "))]
    MissingColumn {
        field: &'static str,
        aliases: &'static [&'static str],
    },

    #[error("press release date is required for {url}; the date column must hold a valid ISO-8601 or YYYY-MM-DD value")]
    MissingPressDate { url: String },

    #[error("Invalid press release date: '{0}'")]
    InvalidPressDate(String),

    #[error("Checkpoint name must contain only letters, digits, hyphens and underscores: '{0}'")]
    InvalidCheckpointName(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Press-Ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{analyze, CrawlOrchestrator, Fetcher, HttpFetcher, PendingStatus};
pub use ingest::{BulkOutcome, BulkReport, BulkRunner, Table};
pub use model::{CrawlResult, LinkDescriptor, LinkKind, PageLink, SelectionMethod};
pub use storage::{CompanyRecord, CompanyStore, ConnectionPool, DocumentStore};
