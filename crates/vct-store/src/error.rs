//! Error types for the table store.

use std::path::PathBuf;

use thiserror::Error;
use vct_ingest::IngestError;
use vct_model::SchemaError;

/// Errors raised while writing to or reading from the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database file could not be opened.
    #[error("failed to open database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A read-only open was requested for a database that does not exist.
    #[error("database not found: {path}")]
    DatabaseNotFound { path: PathBuf },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The destination name collides with a table the store manages itself.
    #[error("table name is reserved: {0}")]
    ReservedTableName(String),

    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// A progress hook stopped the load before the end of the file.
    #[error("load of {table} interrupted after {committed_rows} committed rows")]
    Interrupted { table: String, committed_rows: u64 },

    #[error("dataframe error: {0}")]
    Frame(#[from] polars::prelude::PolarsError),

    #[error("failed to prepare database directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
