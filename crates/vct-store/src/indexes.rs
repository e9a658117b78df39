//! Best-effort lookup indexes on commonly filtered columns.

use tracing::{debug, warn};

use crate::error::Result;
use crate::sql::{create_index_sql, index_name};
use crate::store::Store;

/// Columns that get an index whenever a table has them.
pub const INDEX_COLUMNS: &[&str] = &[
    "tournament",
    "stage",
    "match_type",
    "match_name",
    "map",
    "player",
    "team",
    "agent",
    "agents",
    "year",
    "date",
];

impl Store {
    /// Creates an index for each allow-listed column present in `table`.
    ///
    /// A failing index is logged and skipped. Returns the names of the
    /// indexes that exist afterwards.
    pub fn create_lookup_indexes(&self, table: &str) -> Result<Vec<String>> {
        let columns = self.table_columns(table)?;
        let mut created = Vec::new();

        for column in INDEX_COLUMNS
            .iter()
            .filter(|wanted| columns.iter().any(|c| c.name == **wanted))
        {
            match self.connection().execute_batch(&create_index_sql(table, column)) {
                Ok(()) => {
                    debug!(table, column, "index created");
                    created.push(index_name(table, column));
                }
                Err(err) => {
                    warn!(table, column, error = %err, "index creation failed");
                }
            }
        }
        Ok(created)
    }
}
