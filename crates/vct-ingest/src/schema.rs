//! Destination schema derivation from a CSV sample.

use tracing::debug;
use vct_model::{ColumnDef, TableSchema};

use crate::error::Result;
use crate::infer::infer_column_type;
use crate::naming::sanitize_column_names;
use crate::source::CsvSample;

/// Builds the destination schema for `table` from a header sample.
///
/// Column names are sanitized and de-duplicated in header order; each
/// column's type is inferred from its sampled values.
pub fn infer_schema(table: &str, sample: &CsvSample) -> Result<TableSchema> {
    let names = sanitize_column_names(&sample.headers);
    let columns: Vec<ColumnDef> = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| ColumnDef::new(name, infer_column_type(sample.column_values(idx))))
        .collect();

    let schema = TableSchema::new(table, columns)?;
    debug!(
        table,
        columns = schema.len(),
        sampled_rows = sample.rows.len(),
        "schema inferred"
    );
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vct_model::ColumnType;

    fn sample(headers: &[&str], rows: &[&[&str]]) -> CsvSample {
        CsvSample {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|v| (!v.is_empty()).then(|| v.to_string()))
                        .collect()
                })
                .collect(),
            skipped_rows: 0,
        }
    }

    #[test]
    fn test_schema_names_and_types() {
        let sample = sample(
            &["Player", "Kills", "Rating", "Kills"],
            &[&["aspas", "20", "1.2", "3"], &["less", "", "0.95", "4"]],
        );
        let schema = infer_schema("vct_2024_players_stats", &sample).unwrap();
        let columns: Vec<_> = schema
            .columns()
            .iter()
            .map(|c| (c.name.as_str(), c.column_type))
            .collect();
        assert_eq!(
            columns,
            vec![
                ("player", ColumnType::Text),
                ("kills", ColumnType::Integer),
                ("rating", ColumnType::Real),
                ("kills_1", ColumnType::Integer),
            ]
        );
    }

    #[test]
    fn test_header_only_sample_is_all_text() {
        let sample = sample(&["a", "b"], &[]);
        let schema = infer_schema("t", &sample).unwrap();
        assert!(
            schema
                .columns()
                .iter()
                .all(|c| c.column_type == ColumnType::Text)
        );
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let sample = sample(&["a"], &[&["1"]]);
        assert!(infer_schema("Bad Name", &sample).is_err());
    }
}
