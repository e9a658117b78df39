//! The `import_metadata` bookkeeping table.

use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;
use vct_model::{IMPORT_METADATA_TABLE, ImportRecord};

use crate::error::Result;
use crate::sql::quote_ident;
use crate::store::Store;

pub(crate) fn ensure_metadata_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            table_name TEXT NOT NULL UNIQUE,
            source_file TEXT NOT NULL,
            row_count INTEGER NOT NULL,
            column_count INTEGER NOT NULL,
            import_timestamp TEXT NOT NULL
        );
        "#,
        quote_ident(IMPORT_METADATA_TABLE)
    ))?;
    Ok(())
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ImportRecord> {
    Ok(ImportRecord {
        table_name: row.get(0)?,
        source_file: row.get(1)?,
        row_count: u64::try_from(row.get::<_, i64>(2)?).unwrap_or_default(),
        column_count: usize::try_from(row.get::<_, i64>(3)?).unwrap_or_default(),
        import_timestamp: row.get(4)?,
    })
}

impl Store {
    /// Inserts or replaces one record per table name in a single transaction.
    pub fn upsert_import_records(&mut self, records: &[ImportRecord]) -> Result<usize> {
        let tx = self.connection_mut().transaction()?;
        {
            let mut stmt = tx.prepare_cached(&format!(
                r#"
                INSERT INTO {} (table_name, source_file, row_count, column_count, import_timestamp)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(table_name) DO UPDATE SET
                    source_file = excluded.source_file,
                    row_count = excluded.row_count,
                    column_count = excluded.column_count,
                    import_timestamp = excluded.import_timestamp
                "#,
                quote_ident(IMPORT_METADATA_TABLE)
            ))?;
            for record in records {
                stmt.execute(params![
                    record.table_name,
                    record.source_file,
                    i64::try_from(record.row_count).unwrap_or(i64::MAX),
                    i64::try_from(record.column_count).unwrap_or(i64::MAX),
                    record.import_timestamp,
                ])?;
            }
        }
        tx.commit()?;
        debug!(records = records.len(), "import metadata updated");
        Ok(records.len())
    }

    /// All import records ordered by table name.
    ///
    /// Empty when the store predates the metadata table.
    pub fn import_records(&self) -> Result<Vec<ImportRecord>> {
        if !self.table_exists(IMPORT_METADATA_TABLE)? {
            return Ok(Vec::new());
        }
        let mut stmt = self.connection().prepare(&format!(
            "SELECT table_name, source_file, row_count, column_count, import_timestamp FROM {} ORDER BY table_name",
            quote_ident(IMPORT_METADATA_TABLE)
        ))?;
        let rows = stmt.query_map([], record_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    pub fn import_record(&self, table: &str) -> Result<Option<ImportRecord>> {
        if !self.table_exists(IMPORT_METADATA_TABLE)? {
            return Ok(None);
        }
        let record = self
            .connection()
            .query_row(
                &format!(
                    "SELECT table_name, source_file, row_count, column_count, import_timestamp FROM {} WHERE table_name = ?1",
                    quote_ident(IMPORT_METADATA_TABLE)
                ),
                params![table],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(table: &str, rows: u64, stamp: &str) -> ImportRecord {
        ImportRecord {
            table_name: table.to_string(),
            source_file: format!("data/{table}.csv"),
            row_count: rows,
            column_count: 4,
            import_timestamp: stamp.to_string(),
        }
    }

    #[test]
    fn test_upsert_last_wins() {
        let mut store = Store::open_in_memory().unwrap();
        store
            .upsert_import_records(&[record("players", 10, "2024-01-01T00:00:00Z")])
            .unwrap();
        store
            .upsert_import_records(&[
                record("players", 12, "2024-02-01T00:00:00Z"),
                record("agents", 3, "2024-02-01T00:00:00Z"),
            ])
            .unwrap();

        let records = store.import_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].table_name, "agents");
        assert_eq!(records[1].row_count, 12);
        assert_eq!(records[1].import_timestamp, "2024-02-01T00:00:00Z");
    }

    #[test]
    fn test_import_record_lookup() {
        let mut store = Store::open_in_memory().unwrap();
        assert!(store.import_record("players").unwrap().is_none());
        store
            .upsert_import_records(&[record("players", 10, "t")])
            .unwrap();
        let found = store.import_record("players").unwrap().unwrap();
        assert_eq!(found.source_file, "data/players.csv");
    }

    #[test]
    fn test_metadata_table_hidden_from_listing() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.list_tables().unwrap().is_empty());
    }
}
