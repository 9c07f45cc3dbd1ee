//! Named snapshots of every collection
//!
//! A checkpoint is a directory `<dir>/<name>/` holding one JSON array per
//! collection, one object per row keyed by column name. Restoring replaces
//! each collection's rows with the snapshot's, inside a transaction.

use crate::storage::pool::ConnectionPool;
use crate::storage::schema::Collection;
use crate::storage::traits::{StorageError, StorageResult};
use crate::ValidationError;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Checkpoint manager over a pool and a snapshot directory
pub struct Checkpoints {
    pool: Arc<ConnectionPool>,
    dir: PathBuf,
}

impl Checkpoints {
    pub fn new(pool: Arc<ConnectionPool>, dir: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            dir: dir.into(),
        }
    }

    /// Saves every collection under `name`, returning rows written per collection
    pub fn create(&self, name: &str) -> crate::Result<Vec<(Collection, usize)>> {
        let out_dir = self.dir.join(validate_name(name)?);
        std::fs::create_dir_all(&out_dir)?;

        let mut written = Vec::new();
        for collection in Collection::ALL {
            let rows = self
                .pool
                .with_collection(collection, |conn| dump_table(conn, collection.table()))?;
            let path = snapshot_path(&out_dir, collection);
            std::fs::write(&path, serde_json::to_string_pretty(&rows)?)?;
            tracing::info!("{}: {} rows -> {}", collection.table(), rows.len(), path.display());
            written.push((collection, rows.len()));
        }

        Ok(written)
    }

    /// Names of existing checkpoints, sorted
    pub fn list(&self) -> crate::Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Replaces collection contents with the snapshot saved under `name`
    ///
    /// Collections without a snapshot file are left untouched.
    pub fn restore(&self, name: &str) -> crate::Result<Vec<(Collection, usize)>> {
        let in_dir = self.dir.join(validate_name(name)?);
        if !in_dir.is_dir() {
            return Err(StorageError::CheckpointNotFound(name.to_string()).into());
        }

        let mut restored = Vec::new();
        for collection in Collection::ALL {
            let path = snapshot_path(&in_dir, collection);
            if !path.exists() {
                continue;
            }

            let rows: Vec<Map<String, Value>> =
                serde_json::from_str(&std::fs::read_to_string(&path)?)?;
            let count = rows.len();
            self.pool.with_collection(collection, |conn| {
                replace_table(conn, collection.table(), &rows)
            })?;
            tracing::info!("{}: restored {} rows", collection.table(), count);
            restored.push((collection, count));
        }

        Ok(restored)
    }
}

fn validate_name(name: &str) -> Result<&str, ValidationError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(name)
    } else {
        Err(ValidationError::InvalidCheckpointName(name.to_string()))
    }
}

fn snapshot_path(dir: &Path, collection: Collection) -> PathBuf {
    dir.join(format!("{}.json", collection.table()))
}

fn dump_table(conn: &Connection, table: &str) -> StorageResult<Vec<Map<String, Value>>> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_ident(table)))?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let rows = stmt
        .query_map([], |row| {
            let mut object = Map::new();
            for (i, column) in columns.iter().enumerate() {
                object.insert(column.clone(), to_json(row.get_ref(i)?));
            }
            Ok(object)
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn replace_table(
    conn: &mut Connection,
    table: &str,
    rows: &[Map<String, Value>],
) -> StorageResult<()> {
    let tx = conn.transaction()?;

    let known = table_columns(&tx, table)?;
    if let Some(column) = rows
        .iter()
        .flat_map(|row| row.keys())
        .find(|column| !known.contains(column.as_str()))
    {
        return Err(StorageError::UnknownColumn {
            table: table.to_string(),
            column: column.clone(),
        });
    }

    tx.execute(&format!("DELETE FROM {}", quote_ident(table)), [])?;

    for row in rows {
        let columns: Vec<String> = row.keys().map(|c| quote_ident(c)).collect();
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            columns.join(", "),
            placeholders.join(", ")
        );
        tx.execute(&sql, params_from_iter(row.values().map(to_sql)))?;
    }

    tx.commit()?;
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> StorageResult<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<HashSet<_>, _>>()?;
    Ok(columns)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(hex::encode(b)),
    }
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}
