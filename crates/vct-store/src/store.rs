//! SQLite connection ownership and table-level operations.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags, params};
use serde::Serialize;
use tracing::{debug, info};
use vct_model::{ColumnType, TableSchema};

use crate::error::{Result, StoreError};
use crate::metadata::ensure_metadata_table;
use crate::sql::{count_rows_sql, create_table_sql, drop_table_sql, is_reserved_table_name, quote_ident};

/// A column as declared in the live store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub declared_type: String,
}

impl ColumnInfo {
    pub fn column_type(&self) -> ColumnType {
        ColumnType::from_declared(&self.declared_type)
    }
}

/// The embedded relational store holding one table per source file.
pub struct Store {
    conn: Connection,
    path: PathBuf,
    read_only: bool,
}

impl Store {
    /// Opens (or creates) a writable store.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::init_writable(conn, path.to_path_buf())
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_writable(conn, PathBuf::from(":memory:"))
    }

    fn init_writable(conn: Connection, path: PathBuf) -> Result<Self> {
        conn.execute_batch(
            r#"
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            "#,
        )?;
        ensure_metadata_table(&conn)?;
        debug!(path = %path.display(), "store opened");
        Ok(Self {
            conn,
            path,
            read_only: false,
        })
    }

    /// Opens an existing store without write access.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(StoreError::DatabaseNotFound {
                path: path.to_path_buf(),
            });
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
            read_only: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Drops and recreates the table described by `schema` in one transaction.
    pub fn recreate_table(&mut self, schema: &TableSchema) -> Result<()> {
        if is_reserved_table_name(schema.name()) {
            return Err(StoreError::ReservedTableName(schema.name().to_string()));
        }
        let tx = self.conn.transaction()?;
        tx.execute_batch(&drop_table_sql(schema.name()))?;
        tx.execute_batch(&create_table_sql(schema))?;
        tx.commit()?;
        info!(table = schema.name(), columns = schema.len(), "table recreated");
        Ok(())
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn row_count(&self, table: &str) -> Result<u64> {
        if !self.table_exists(table)? {
            return Err(StoreError::UnknownTable(table.to_string()));
        }
        let count: i64 = self
            .conn
            .query_row(&count_rows_sql(table), [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    /// User tables in name order, excluding the metadata table and SQLite
    /// internals.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut tables = Vec::new();
        for name in names {
            let name = name?;
            if !is_reserved_table_name(&name) {
                tables.push(name);
            }
        }
        Ok(tables)
    }

    /// Declared columns of a table, in definition order.
    pub fn table_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
        let rows = stmt.query_map([], |row| {
            Ok(ColumnInfo {
                name: row.get(1)?,
                declared_type: row.get(2)?,
            })
        })?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row?);
        }
        if columns.is_empty() {
            return Err(StoreError::UnknownTable(table.to_string()));
        }
        Ok(columns)
    }

    /// Folds the write-ahead log back into the main database file.
    pub fn checkpoint(&self) -> Result<()> {
        if !self.read_only {
            self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        }
        Ok(())
    }

    /// Size of the database file on disk (0 for in-memory stores).
    pub fn file_size(&self) -> u64 {
        std::fs::metadata(&self.path)
            .map(|meta| meta.len())
            .unwrap_or(0)
    }
}
