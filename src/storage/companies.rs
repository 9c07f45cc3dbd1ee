//! Company registry
//!
//! Keyed by canonical ticker. Adding an existing ticker overwrites name,
//! sector and metadata with the latest values (last write wins).

use crate::storage::pool::ConnectionPool;
use crate::storage::schema::Collection;
use crate::storage::traits::{CompanyStorage, StorageResult};
use crate::storage::{canonical_ticker, CompanyRecord};
use rusqlite::{params, OptionalExtension, Row};
use serde_json::{Map, Value};
use std::sync::Arc;

/// SQLite-backed company registry
#[derive(Clone)]
pub struct CompanyStore {
    pool: Arc<ConnectionPool>,
}

impl CompanyStore {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

fn read_company(row: &Row<'_>) -> rusqlite::Result<(String, String, Option<String>, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn decode(
    (ticker, name, sector, metadata): (String, String, Option<String>, String),
) -> StorageResult<CompanyRecord> {
    Ok(CompanyRecord {
        ticker,
        name,
        sector,
        metadata: serde_json::from_str(&metadata)?,
    })
}

impl CompanyStorage for CompanyStore {
    fn add(
        &self,
        ticker: &str,
        name: &str,
        sector: Option<&str>,
        metadata: Map<String, Value>,
    ) -> StorageResult<String> {
        let ticker = canonical_ticker(ticker);
        let metadata = serde_json::to_string(&metadata)?;

        self.pool.with_collection(Collection::Companies, |conn| {
            conn.execute(
                "INSERT INTO companies (ticker, name, sector, metadata) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(ticker) DO UPDATE SET
                    name = excluded.name,
                    sector = excluded.sector,
                    metadata = excluded.metadata",
                params![ticker, name, sector, metadata],
            )?;
            Ok(())
        })?;

        tracing::debug!("Upserted company {}", ticker);
        Ok(ticker)
    }

    fn get(&self, ticker: &str) -> StorageResult<Option<CompanyRecord>> {
        let ticker = canonical_ticker(ticker);

        let row = self.pool.with_collection(Collection::Companies, |conn| {
            let row = conn
                .query_row(
                    "SELECT ticker, name, sector, metadata FROM companies WHERE ticker = ?1",
                    params![ticker],
                    read_company,
                )
                .optional()?;
            Ok(row)
        })?;

        row.map(decode).transpose()
    }

    fn list_all(&self) -> StorageResult<Vec<CompanyRecord>> {
        let rows = self.pool.with_collection(Collection::Companies, |conn| {
            let mut stmt = conn.prepare("SELECT ticker, name, sector, metadata FROM companies")?;
            let rows = stmt
                .query_map([], read_company)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        rows.into_iter().map(decode).collect()
    }
}
