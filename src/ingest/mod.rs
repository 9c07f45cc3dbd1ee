//! Ingestion entry points
//!
//! This module turns requests into crawl documents:
//! - Tabular input with static column alias tables
//! - Press-release date parsing
//! - The bulk runner over a press-release table
//! - Single-URL ingestion and crawl-only reports
//! - Company registry import

mod bulk;
mod companies;
mod date;
mod single;
mod table;

pub use bulk::{BulkOutcome, BulkReport, BulkRunner, SkippedRow};
pub use companies::{import_companies, CompanyImport, ImportedCompany};
pub use date::parse_press_date;
pub use single::{crawl_report, ingest_single, CrawlReport, ReportSave, SingleOutcome, SingleRequest};
pub use table::{ColumnMap, ColumnSpec, Table, COMPANY_COLUMNS, PRESS_RELEASE_COLUMNS};

use crate::model::LinkDescriptor;
use serde_json::{Map, Value};

/// Metadata recorded on a stored document about the link that produced it
pub(crate) fn link_metadata(link: &LinkDescriptor) -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert(
        "selection_method".to_string(),
        Value::from(link.selection_method().as_str()),
    );
    metadata.insert(
        "score".to_string(),
        link.score().map(Value::from).unwrap_or(Value::Null),
    );
    metadata
}
