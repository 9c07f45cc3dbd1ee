//! Company registry import from tabular input

use crate::ingest::bulk::SkippedRow;
use crate::ingest::table::{ColumnMap, Table, COMPANY_COLUMNS};
use crate::storage::CompanyStorage;
use serde::Serialize;
use serde_json::Map;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedCompany {
    pub ticker: String,
    pub name: String,
}

/// Companies upserted by an import, plus rows left out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompanyImport {
    pub added: Vec<ImportedCompany>,
    pub skipped: Vec<SkippedRow>,
}

/// Upserts every row of a company table
///
/// Rows with an empty ticker or name are skipped. An empty sector cell
/// is stored as no sector.
///
/// # Errors
///
/// * `IngestError::Validation` - the ticker or name column is missing
/// * `IngestError::Storage` - an upsert failed
pub fn import_companies(store: &dyn CompanyStorage, table: &Table) -> crate::Result<CompanyImport> {
    let columns = ColumnMap::resolve(&table.headers, COMPANY_COLUMNS)?;

    let mut import = CompanyImport::default();
    for (i, cells) in table.rows.iter().enumerate() {
        let ticker = columns.cell(cells, "ticker");
        let name = columns.cell(cells, "name");
        if ticker.is_empty() || name.is_empty() {
            import.skipped.push(SkippedRow {
                row: i + 1,
                reason: "empty ticker or name".to_string(),
            });
            continue;
        }

        let sector = columns.cell(cells, "sector");
        let sector = (!sector.is_empty()).then_some(sector);
        let ticker = store.add(ticker, name, sector, Map::new())?;
        import.added.push(ImportedCompany {
            ticker,
            name: name.to_string(),
        });
    }

    tracing::info!(
        "Imported {} companies ({} rows skipped)",
        import.added.len(),
        import.skipped.len()
    );
    Ok(import)
}
