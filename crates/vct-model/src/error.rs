use thiserror::Error;

/// Violations of the [`TableSchema`](crate::TableSchema) invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("invalid table name '{0}'")]
    InvalidTableName(String),

    #[error("table '{table}' has no columns")]
    NoColumns { table: String },

    #[error("invalid column name '{column}' in table '{table}'")]
    InvalidColumnName { table: String, column: String },

    #[error("duplicate column name '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },
}
