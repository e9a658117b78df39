//! VCT CSV ingestion utilities.
//!
//! This crate turns a directory of tournament-statistics CSV exports into
//! inputs the store can load: it discovers source files, picks a text encoding
//! per file, reads a bounded schema sample, and derives storage-safe table and
//! column names plus per-column types.
//!
//! # Features
//!
//! - **Discovery**: recursive, sorted listing of `*.csv` files
//! - **Encoding detection**: ordered candidate decoders, strict decoding
//! - **Windowed reading**: header sample plus fixed-size row windows
//! - **Naming**: identifier sanitization, de-duplication, table names from paths
//! - **Type inference**: Integer / Real / Text from sampled values
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use vct_ingest::{SourceReader, default_encodings, infer_schema, list_csv_files, table_name_for};
//!
//! let root = Path::new("data");
//! for path in list_csv_files(root)? {
//!     let table = table_name_for(&path, root)?;
//!     let reader = SourceReader::open(&path, &default_encodings())?;
//!     let sample = reader.sample(1000)?;
//!     let schema = infer_schema(&table, &sample)?;
//! }
//! ```

mod discovery;
mod encoding;
mod error;
mod infer;
mod naming;
mod schema;
mod source;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use source::{CsvSample, Row, RowWindow, RowWindows, SourceReader};

// === File Discovery ===
pub use discovery::list_csv_files;

// === Encodings ===
pub use encoding::{
    default_encodings, detect_encoding, encoding_names, parse_encoding_label, validate_encoding,
};

// === Naming ===
pub use naming::{
    EMPTY_COLUMN_NAME, EMPTY_TABLE_NAME, dedupe_names, sanitize_column_names,
    sanitize_identifier, table_name_for,
};

// === Type Inference ===
pub use infer::{INFERENCE_SAMPLE_LIMIT, infer_column_type};
pub use schema::infer_schema;
