//! Data model for the VCT statistics store.
//!
//! The importer builds a [`TableSchema`] for every source file from a bounded
//! sample of rows, hands it to the store as plain data, and reports what
//! happened per file as a [`FileOutcome`]. Successful imports are tracked in
//! the metadata table as [`ImportRecord`]s.
//!
//! # Module Organization
//!
//! - [`schema`]: column types and validated table schemas
//! - [`record`]: the per-table provenance row
//! - [`outcome`]: per-file outcomes and the run summary

pub mod error;
pub mod outcome;
pub mod record;
pub mod schema;

pub use error::SchemaError;
pub use outcome::{FileOutcome, ImportSummary, OutcomeStatus};
pub use record::{IMPORT_METADATA_TABLE, ImportRecord};
pub use schema::{ColumnDef, ColumnType, TableSchema, is_valid_identifier};
