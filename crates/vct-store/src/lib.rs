//! SQLite-backed storage for VCT statistics tables.
//!
//! Each source CSV becomes one table. The [`BatchLoader`] recreates the table
//! from an inferred [`TableSchema`](vct_model::TableSchema) and streams rows in
//! with periodic commits; the `import_metadata` table records where every
//! table came from; [`verify`] audits the result; and [`TableProvider`] gives
//! read-only, cached access for presentation code.

mod access;
mod error;
mod indexes;
mod loader;
mod metadata;
pub mod sql;
mod store;
mod verify;

pub use access::{TableProvider, available_years, find_column, missing_columns};
pub use error::{Result, StoreError};
pub use indexes::INDEX_COLUMNS;
pub use loader::{BatchLoader, LoadOptions, LoadProgress, LoadReport, LoadStatus};
pub use store::{ColumnInfo, Store};
pub use verify::{
    Anomaly, DEFAULT_SAMPLE_TABLES, MANY_COLUMNS_THRESHOLD, TableCategory, TableReport,
    VerifyReport, verify,
};
