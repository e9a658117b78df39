//! Chunked loading of one source file into one table.
//!
//! A load reads a bounded header sample to build the table schema, recreates
//! the table, then streams the file in windows of `batch_size` rows. Work is
//! committed every `commit_every` windows; a failure (or an interruption from
//! the progress hook) rolls back only the open transaction, so rows committed
//! at earlier checkpoints remain in the table.

use std::ops::ControlFlow;
use std::path::Path;

use encoding_rs::Encoding;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use tracing::{debug, info, info_span, warn};
use vct_ingest::{Row, SourceReader, default_encodings, encoding_names, infer_schema};
use vct_model::{ColumnType, TableSchema};

use crate::error::{Result, StoreError};
use crate::sql::{insert_sql, is_reserved_table_name};
use crate::store::Store;

/// Options controlling a file load.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Rows per insert window.
    /// Defaults to 1000.
    pub batch_size: usize,

    /// Data rows read for schema inference.
    /// Defaults to 1000.
    pub sample_rows: usize,

    /// Windows per committed transaction.
    /// Defaults to 10.
    pub commit_every: usize,

    /// Candidate encodings, tried in order.
    /// Defaults to UTF-8 then Windows-1252.
    pub encodings: Vec<&'static Encoding>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            sample_rows: 1000,
            commit_every: 10,
            encodings: default_encodings(),
        }
    }
}

impl LoadOptions {
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn with_sample_rows(mut self, rows: usize) -> Self {
        self.sample_rows = rows.max(1);
        self
    }

    pub fn with_commit_every(mut self, windows: usize) -> Self {
        self.commit_every = windows.max(1);
        self
    }

    pub fn with_encodings(mut self, encodings: Vec<&'static Encoding>) -> Self {
        if !encodings.is_empty() {
            self.encodings = encodings;
        }
        self
    }

    /// Human-readable list of candidate encodings.
    pub fn encoding_list(&self) -> String {
        encoding_names(&self.encodings)
    }
}

/// Snapshot handed to the progress hook after each window.
#[derive(Debug, Clone, Copy)]
pub struct LoadProgress<'a> {
    pub table: &'a str,
    pub windows: usize,
    pub rows: u64,
    pub committed_rows: u64,
}

/// Result of a completed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub table: String,
    /// Rows in the table after the final commit.
    pub rows: u64,
    pub columns: usize,
    pub windows: usize,
    /// Malformed rows dropped while streaming the file.
    pub skipped_rows: usize,
    pub encoding: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded(LoadReport),
    /// No data rows; the table was left untouched.
    Skipped { table: String, reason: String },
}

/// Loads source files into a [`Store`].
pub struct BatchLoader<'s> {
    store: &'s mut Store,
    options: LoadOptions,
}

impl<'s> BatchLoader<'s> {
    pub fn new(store: &'s mut Store, options: LoadOptions) -> Self {
        Self { store, options }
    }

    pub fn load(&mut self, source: &Path, table: &str) -> Result<LoadStatus> {
        self.load_with_progress(source, table, |_| ControlFlow::Continue(()))
    }

    /// Loads `source` into `table`, calling `hook` after every window.
    ///
    /// Returning [`ControlFlow::Break`] from the hook stops the load with
    /// [`StoreError::Interrupted`].
    pub fn load_with_progress<F>(
        &mut self,
        source: &Path,
        table: &str,
        mut hook: F,
    ) -> Result<LoadStatus>
    where
        F: FnMut(&LoadProgress<'_>) -> ControlFlow<()>,
    {
        let span = info_span!("load", table, source = %source.display());
        let _guard = span.enter();

        if is_reserved_table_name(table) {
            return Err(StoreError::ReservedTableName(table.to_string()));
        }

        let reader = SourceReader::open(source, &self.options.encodings)?;
        let sample = reader.sample(self.options.sample_rows)?;
        if sample.is_empty() {
            info!("no data rows, skipping");
            return Ok(LoadStatus::Skipped {
                table: table.to_string(),
                reason: "no data rows".to_string(),
            });
        }
        let schema = infer_schema(table, &sample)?;
        drop(sample);

        self.store.recreate_table(&schema)?;
        let (windows, rows, skipped_rows) = self.stream_rows(&reader, &schema, &mut hook)?;

        let rows_in_table = self.store.row_count(table)?;
        if rows_in_table != rows {
            warn!(inserted = rows, counted = rows_in_table, "row count differs from rows inserted");
        }
        info!(
            rows = rows_in_table,
            columns = schema.len(),
            windows,
            skipped_rows,
            encoding = reader.encoding().name(),
            "table loaded"
        );

        Ok(LoadStatus::Loaded(LoadReport {
            table: table.to_string(),
            rows: rows_in_table,
            columns: schema.len(),
            windows,
            skipped_rows,
            encoding: reader.encoding().name(),
        }))
    }

    /// Streams every data row into the freshly created table.
    ///
    /// Returns (windows, inserted rows, dropped rows).
    fn stream_rows<F>(
        &mut self,
        reader: &SourceReader,
        schema: &TableSchema,
        hook: &mut F,
    ) -> Result<(usize, u64, usize)>
    where
        F: FnMut(&LoadProgress<'_>) -> ControlFlow<()>,
    {
        let insert = insert_sql(schema);
        let types: Vec<ColumnType> = schema.columns().iter().map(|c| c.column_type).collect();
        let commit_every = self.options.commit_every.max(1);

        let mut windows = reader.windows(self.options.batch_size)?;
        let conn = self.store.connection_mut();

        let mut window_count = 0usize;
        let mut rows = 0u64;
        let mut committed_rows = 0u64;
        let mut skipped = 0usize;
        let mut exhausted = false;

        while !exhausted {
            let tx = conn.transaction()?;
            let mut in_transaction = 0usize;
            while in_transaction < commit_every {
                let Some(window) = windows.next() else {
                    exhausted = true;
                    break;
                };
                let window = window?;
                skipped += window.skipped;
                rows += window.rows.len() as u64;
                {
                    let mut stmt = tx.prepare_cached(&insert)?;
                    for row in window.rows {
                        stmt.execute(params_from_iter(row_values(row, &types)))?;
                    }
                }
                window_count += 1;
                in_transaction += 1;

                // The checkpoint window reports after its commit below.
                if in_transaction < commit_every {
                    let progress = LoadProgress {
                        table: schema.name(),
                        windows: window_count,
                        rows,
                        committed_rows,
                    };
                    check_progress(hook, &progress)?;
                }
            }
            tx.commit()?;
            committed_rows = rows;

            if in_transaction == commit_every {
                debug!(windows = window_count, committed_rows, "checkpoint committed");
                let progress = LoadProgress {
                    table: schema.name(),
                    windows: window_count,
                    rows,
                    committed_rows,
                };
                check_progress(hook, &progress)?;
            }
        }

        Ok((window_count, rows, skipped))
    }
}

fn check_progress<F>(hook: &mut F, progress: &LoadProgress<'_>) -> Result<()>
where
    F: FnMut(&LoadProgress<'_>) -> ControlFlow<()>,
{
    if hook(progress).is_break() {
        warn!(
            windows = progress.windows,
            committed_rows = progress.committed_rows,
            "load interrupted"
        );
        return Err(StoreError::Interrupted {
            table: progress.table.to_string(),
            committed_rows: progress.committed_rows,
        });
    }
    Ok(())
}

/// Converts a decoded row into storage values by column type.
fn row_values(row: Row, types: &[ColumnType]) -> impl Iterator<Item = Value> + '_ {
    row.into_iter()
        .zip(types.iter().copied())
        .map(|(value, column_type)| to_value(value, column_type))
}

fn to_value(value: Option<String>, column_type: ColumnType) -> Value {
    let Some(text) = value else {
        return Value::Null;
    };
    let trimmed = text.trim();
    if trimmed.is_empty() && column_type != ColumnType::Text {
        return Value::Null;
    }
    match column_type {
        ColumnType::Integer => {
            if let Ok(int) = trimmed.parse::<i64>() {
                Value::Integer(int)
            } else if let Ok(real) = trimmed.parse::<f64>() {
                Value::Real(real)
            } else {
                Value::Text(text)
            }
        }
        ColumnType::Real => match trimmed.parse::<f64>() {
            Ok(real) => Value::Real(real),
            Err(_) => Value::Text(text),
        },
        ColumnType::Text => Value::Text(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_value_by_column_type() {
        assert_eq!(to_value(None, ColumnType::Integer), Value::Null);
        assert_eq!(
            to_value(Some("42".into()), ColumnType::Integer),
            Value::Integer(42)
        );
        assert_eq!(
            to_value(Some("4.5".into()), ColumnType::Integer),
            Value::Real(4.5)
        );
        assert_eq!(
            to_value(Some("n/a".into()), ColumnType::Integer),
            Value::Text("n/a".into())
        );
        assert_eq!(to_value(Some("7".into()), ColumnType::Real), Value::Real(7.0));
        assert_eq!(
            to_value(Some("007".into()), ColumnType::Text),
            Value::Text("007".into())
        );
    }

    #[test]
    fn test_whitespace_only_numeric_cells_are_null() {
        assert_eq!(to_value(Some("   ".into()), ColumnType::Integer), Value::Null);
        assert_eq!(to_value(Some("\t".into()), ColumnType::Real), Value::Null);
        assert_eq!(
            to_value(Some("  ".into()), ColumnType::Text),
            Value::Text("  ".into())
        );
    }

    #[test]
    fn test_options_builder_clamps() {
        let options = LoadOptions::default()
            .with_batch_size(0)
            .with_commit_every(0)
            .with_encodings(Vec::new());
        assert_eq!(options.batch_size, 1);
        assert_eq!(options.commit_every, 1);
        assert_eq!(options.encodings.len(), 2);
        assert_eq!(options.encoding_list(), "UTF-8, windows-1252");
    }
}
