//! Shared SQLite connection with lazy, guarded provisioning
//!
//! The pool is constructed once per process and shared by reference (or
//! `Arc`) with every store. The first use opens the connection; the first
//! use of each collection provisions its table and indexes. Both steps run
//! under the same mutex, so concurrent first access initializes exactly once.

use crate::storage::schema::{provision_collection, Collection};
use crate::storage::traits::{StorageError, StorageResult};
use rusqlite::Connection;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Target {
    File(PathBuf),
    Memory,
}

#[derive(Default)]
struct PoolState {
    conn: Option<Connection>,
    provisioned: HashSet<Collection>,
}

/// Lazily connected SQLite handle shared by the stores
pub struct ConnectionPool {
    target: Target,
    state: Mutex<PoolState>,
}

impl ConnectionPool {
    /// Creates a pool for a database file; nothing is opened until first use
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_target(Target::File(path.into()))
    }

    /// Creates a pool backed by a private in-memory database
    pub fn in_memory() -> Self {
        Self::with_target(Target::Memory)
    }

    fn with_target(target: Target) -> Self {
        Self {
            target,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Database file path, if file-backed
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            Target::File(path) => Some(path),
            Target::Memory => None,
        }
    }

    /// True once the connection has been opened
    pub fn is_connected(&self) -> bool {
        self.state
            .lock()
            .map(|state| state.conn.is_some())
            .unwrap_or(false)
    }

    /// Runs `f` with the connection, provisioning `collection` first if needed
    pub fn with_collection<T>(
        &self,
        collection: Collection,
        f: impl FnOnce(&mut Connection) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut state = self.state.lock().map_err(|_| StorageError::LockPoisoned)?;
        let PoolState { conn, provisioned } = &mut *state;

        let conn = match conn {
            Some(conn) => conn,
            slot @ None => slot.insert(self.connect()?),
        };

        if !provisioned.contains(&collection) {
            provision_collection(conn, collection)?;
            provisioned.insert(collection);
            tracing::debug!("Provisioned collection {}", collection.table());
        }

        f(conn)
    }

    /// Provisions every registered collection now
    pub fn provision_all(&self) -> StorageResult<()> {
        for collection in Collection::ALL {
            self.with_collection(collection, |_| Ok(()))?;
        }
        Ok(())
    }

    fn connect(&self) -> StorageResult<Connection> {
        let conn = match &self.target {
            Target::File(path) => {
                tracing::debug!("Opening database {}", path.display());
                let conn = Connection::open(path)?;
                conn.execute_batch(
                    "
                    PRAGMA journal_mode = WAL;
                    PRAGMA synchronous = NORMAL;
                    PRAGMA temp_store = MEMORY;
                ",
                )?;
                conn
            }
            Target::Memory => Connection::open_in_memory()?,
        };
        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn table_exists(pool: &ConnectionPool, collection: Collection, table: &str) -> bool {
        pool.with_collection(collection, |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get(0),
            )?;
            Ok(count == 1)
        })
        .unwrap()
    }

    #[test]
    fn test_connection_is_lazy() {
        let pool = ConnectionPool::in_memory();
        assert!(!pool.is_connected());

        pool.with_collection(Collection::Companies, |_| Ok(())).unwrap();
        assert!(pool.is_connected());
    }

    #[test]
    fn test_only_used_collection_is_provisioned() {
        let pool = ConnectionPool::in_memory();
        assert!(table_exists(&pool, Collection::Companies, "companies"));

        let crawl_table_present = pool
            .with_collection(Collection::Companies, |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'crawl_results'",
                    [],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .unwrap();
        assert_eq!(crawl_table_present, 0);
    }

    #[test]
    fn test_provision_all() {
        let pool = ConnectionPool::in_memory();
        pool.provision_all().unwrap();
        assert!(table_exists(&pool, Collection::CrawlResults, "crawl_results"));
        assert!(table_exists(&pool, Collection::Companies, "companies"));
    }

    #[test]
    fn test_concurrent_first_access() {
        let dir = tempfile::tempdir().unwrap();
        let pool = Arc::new(ConnectionPool::open(dir.path().join("press.db")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || pool.with_collection(Collection::CrawlResults, |_| Ok(())))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        assert!(pool.is_connected());
    }

    #[test]
    fn test_collections_share_one_connection() {
        let pool = ConnectionPool::in_memory();
        pool.with_collection(Collection::Companies, |conn| {
            conn.execute_batch("CREATE TEMP TABLE marker (id INTEGER)")?;
            Ok(())
        })
        .unwrap();

        assert!(pool
            .with_collection(Collection::CrawlResults, |conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM temp.marker", [], |row| row.get(0))?;
                Ok(count == 0)
            })
            .unwrap());
    }

    #[test]
    fn test_connect_failure_is_reported_and_retried() {
        let dir = tempfile::tempdir().unwrap();
        let pool = ConnectionPool::open(dir.path().join("missing").join("press.db"));

        let err = pool
            .with_collection(Collection::Companies, |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, StorageError::Sqlite(_)));
        assert!(!pool.is_connected());

        std::fs::create_dir(dir.path().join("missing")).unwrap();
        pool.with_collection(Collection::Companies, |_| Ok(())).unwrap();
        assert!(pool.is_connected());
    }

    #[test]
    fn test_file_pool_reports_path() {
        let pool = ConnectionPool::open("/tmp/press.db");
        assert_eq!(pool.path(), Some(Path::new("/tmp/press.db")));
        assert_eq!(ConnectionPool::in_memory().path(), None);
    }
}
