//! Pure SQL text builders.
//!
//! Identifiers are always double-quoted so sanitized names that happen to be
//! SQL keywords (`order`, `group`, `match`) stay usable.

use vct_model::{IMPORT_METADATA_TABLE, TableSchema};

/// Quotes an identifier, doubling embedded quotes.
///
/// ```
/// use vct_store::sql::quote_ident;
///
/// assert_eq!(quote_ident("match"), "\"match\"");
/// assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
/// ```
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Names the loader must never drop or recreate.
pub fn is_reserved_table_name(name: &str) -> bool {
    name.eq_ignore_ascii_case(IMPORT_METADATA_TABLE)
        || name.to_ascii_lowercase().starts_with("sqlite_")
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table))
}

/// `CREATE TABLE` statement for a schema, columns in schema order.
pub fn create_table_sql(schema: &TableSchema) -> String {
    let columns = schema
        .columns()
        .iter()
        .map(|column| format!("{} {}", quote_ident(&column.name), column.column_type.as_sql()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({columns})", quote_ident(schema.name()))
}

/// Positional `INSERT` statement covering every schema column.
pub fn insert_sql(schema: &TableSchema) -> String {
    let names = schema
        .column_names()
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=schema.len())
        .map(|idx| format!("?{idx}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({names}) VALUES ({placeholders})",
        quote_ident(schema.name())
    )
}

pub fn count_rows_sql(table: &str) -> String {
    format!("SELECT COUNT(*) FROM {}", quote_ident(table))
}

pub fn select_sql(table: &str, limit: Option<usize>) -> String {
    match limit {
        Some(limit) => format!("SELECT * FROM {} LIMIT {limit}", quote_ident(table)),
        None => format!("SELECT * FROM {}", quote_ident(table)),
    }
}

pub fn index_name(table: &str, column: &str) -> String {
    format!("idx_{table}_{column}")
}

pub fn create_index_sql(table: &str, column: &str) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
        quote_ident(&index_name(table, column)),
        quote_ident(table),
        quote_ident(column)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use vct_model::{ColumnDef, ColumnType};

    fn schema() -> TableSchema {
        TableSchema::new(
            "vct_2024_matches_overview",
            vec![
                ColumnDef::new("match", ColumnType::Text),
                ColumnDef::new("kills", ColumnType::Integer),
                ColumnDef::new("rating", ColumnType::Real),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_create_table_sql() {
        assert_eq!(
            create_table_sql(&schema()),
            "CREATE TABLE \"vct_2024_matches_overview\" (\"match\" TEXT, \"kills\" INTEGER, \"rating\" REAL)"
        );
    }

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            insert_sql(&schema()),
            "INSERT INTO \"vct_2024_matches_overview\" (\"match\", \"kills\", \"rating\") VALUES (?1, ?2, ?3)"
        );
    }

    #[test]
    fn test_reserved_names() {
        assert!(is_reserved_table_name("import_metadata"));
        assert!(is_reserved_table_name("sqlite_sequence"));
        assert!(!is_reserved_table_name("vct_2024_agents"));
    }

    #[test]
    fn test_index_sql() {
        assert_eq!(index_name("t", "map"), "idx_t_map");
        assert_eq!(
            create_index_sql("t", "map"),
            "CREATE INDEX IF NOT EXISTS \"idx_t_map\" ON \"t\" (\"map\")"
        );
        assert_eq!(select_sql("t", Some(5)), "SELECT * FROM \"t\" LIMIT 5");
    }
}
