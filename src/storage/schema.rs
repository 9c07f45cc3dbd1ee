//! Collection schema definitions and index provisioning
//!
//! Each collection owns a table and a list of supporting indexes. Every
//! statement is `IF NOT EXISTS`, so provisioning is idempotent and safe to
//! repeat on every process start.

use rusqlite::Connection;

/// Collections known to the migration registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    CrawlResults,
    Companies,
}

/// A supporting index on a collection's table
#[derive(Debug, Clone, Copy)]
pub struct IndexSpec {
    pub name: &'static str,
    pub columns: &'static str,
    pub unique: bool,
}

const CRAWL_RESULTS_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS crawl_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ticker TEXT NOT NULL,
    title TEXT NOT NULL,
    press_release_timestamp TEXT NOT NULL,
    source_url TEXT NOT NULL,
    crawl_timestamp TEXT NOT NULL,
    raw_result TEXT NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}',
    unprocessed INTEGER NOT NULL DEFAULT 1
);
"#;

const CRAWL_RESULTS_INDEXES: &[IndexSpec] = &[
    IndexSpec {
        name: "idx_crawl_results_ticker_press_ts",
        columns: "ticker, press_release_timestamp DESC",
        unique: false,
    },
    IndexSpec {
        name: "idx_crawl_results_source_url",
        columns: "source_url",
        unique: false,
    },
    IndexSpec {
        name: "idx_crawl_results_unprocessed",
        columns: "unprocessed",
        unique: false,
    },
];

const COMPANIES_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS companies (
    ticker TEXT NOT NULL,
    name TEXT NOT NULL,
    sector TEXT,
    metadata TEXT NOT NULL DEFAULT '{}'
);
"#;

const COMPANIES_INDEXES: &[IndexSpec] = &[IndexSpec {
    name: "idx_companies_ticker",
    columns: "ticker",
    unique: true,
}];

impl Collection {
    /// Every registered collection, in provisioning order
    pub const ALL: [Collection; 2] = [Collection::CrawlResults, Collection::Companies];

    /// Table name backing the collection
    pub fn table(&self) -> &'static str {
        match self {
            Self::CrawlResults => "crawl_results",
            Self::Companies => "companies",
        }
    }

    fn table_sql(&self) -> &'static str {
        match self {
            Self::CrawlResults => CRAWL_RESULTS_SQL,
            Self::Companies => COMPANIES_SQL,
        }
    }

    pub fn indexes(&self) -> &'static [IndexSpec] {
        match self {
            Self::CrawlResults => CRAWL_RESULTS_INDEXES,
            Self::Companies => COMPANIES_INDEXES,
        }
    }
}

/// Creates a collection's table and indexes if they do not exist
pub fn provision_collection(
    conn: &Connection,
    collection: Collection,
) -> Result<(), rusqlite::Error> {
    conn.execute_batch(collection.table_sql())?;

    for index in collection.indexes() {
        let unique = if index.unique { "UNIQUE " } else { "" };
        conn.execute_batch(&format!(
            "CREATE {}INDEX IF NOT EXISTS {} ON {} ({});",
            unique,
            index.name,
            collection.table(),
            index.columns
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_names(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1 AND name LIKE 'idx_%' ORDER BY name")
            .unwrap();
        stmt.query_map([table], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn test_provision_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        for collection in Collection::ALL {
            provision_collection(&conn, collection).unwrap();
            provision_collection(&conn, collection).unwrap();
        }
    }

    #[test]
    fn test_crawl_results_indexes_exist() {
        let conn = Connection::open_in_memory().unwrap();
        provision_collection(&conn, Collection::CrawlResults).unwrap();

        assert_eq!(
            index_names(&conn, "crawl_results"),
            vec![
                "idx_crawl_results_source_url",
                "idx_crawl_results_ticker_press_ts",
                "idx_crawl_results_unprocessed",
            ]
        );
    }

    #[test]
    fn test_companies_ticker_is_unique() {
        let conn = Connection::open_in_memory().unwrap();
        provision_collection(&conn, Collection::Companies).unwrap();

        conn.execute("INSERT INTO companies (ticker, name) VALUES ('ABC', 'Acme')", [])
            .unwrap();
        let duplicate =
            conn.execute("INSERT INTO companies (ticker, name) VALUES ('ABC', 'Other')", []);
        assert!(duplicate.is_err());
    }
}
