use serde::{Deserialize, Serialize};

/// Name of the bookkeeping table holding one [`ImportRecord`] per table.
pub const IMPORT_METADATA_TABLE: &str = "import_metadata";

/// Provenance and size of one imported table.
///
/// Keyed by `table_name`; a later import of the same table replaces the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub table_name: String,
    pub source_file: String,
    pub row_count: u64,
    pub column_count: usize,
    pub import_timestamp: String,
}
