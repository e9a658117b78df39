//! Column types and table schemas.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SchemaError;

/// Storage type assigned to a column by type inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// SQL type keyword used in table definitions.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }

    /// Maps a declared SQL type back to a column type.
    ///
    /// Unknown declarations fall back to [`ColumnType::Text`].
    pub fn from_declared(declared: &str) -> Self {
        let upper = declared.trim().to_ascii_uppercase();
        if upper.contains("INT") {
            Self::Integer
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            Self::Real
        } else {
            Self::Text
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A named, typed column of a [`TableSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Ordered column layout of a destination table.
///
/// Built once per import from the schema sample and passed to the store as
/// data. The constructor enforces that the table and column names are storage
/// safe identifiers and that column names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnDef>) -> Result<Self, SchemaError> {
        let name = name.into();
        if !is_valid_identifier(&name) {
            return Err(SchemaError::InvalidTableName(name));
        }
        if columns.is_empty() {
            return Err(SchemaError::NoColumns { table: name });
        }
        let mut seen = BTreeSet::new();
        for column in &columns {
            if !is_valid_identifier(&column.name) {
                return Err(SchemaError::InvalidColumnName {
                    table: name,
                    column: column.name.clone(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    table: name,
                    column: column.name.clone(),
                });
            }
        }
        Ok(Self { name, columns })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }
}

/// Returns true for non-empty lowercase `[a-z0-9_]` names not starting with a digit.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if first.is_ascii_digit() {
        return false;
    }
    name.chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_rules() {
        assert!(is_valid_identifier("match_id"));
        assert!(is_valid_identifier("col_2nd_half"));
        assert!(is_valid_identifier("_x"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2nd"));
        assert!(!is_valid_identifier("Team"));
        assert!(!is_valid_identifier("match id"));
    }

    #[test]
    fn test_column_type_from_declared() {
        assert_eq!(ColumnType::from_declared("INTEGER"), ColumnType::Integer);
        assert_eq!(ColumnType::from_declared("bigint"), ColumnType::Integer);
        assert_eq!(ColumnType::from_declared("REAL"), ColumnType::Real);
        assert_eq!(ColumnType::from_declared("double"), ColumnType::Real);
        assert_eq!(ColumnType::from_declared("TEXT"), ColumnType::Text);
        assert_eq!(ColumnType::from_declared(""), ColumnType::Text);
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let result = TableSchema::new(
            "overview",
            vec![
                ColumnDef::new("team", ColumnType::Text),
                ColumnDef::new("team", ColumnType::Text),
            ],
        );
        assert_eq!(
            result,
            Err(SchemaError::DuplicateColumn {
                table: "overview".to_string(),
                column: "team".to_string(),
            })
        );
    }

    #[test]
    fn test_schema_rejects_empty_and_bad_names() {
        assert!(matches!(
            TableSchema::new("overview", vec![]),
            Err(SchemaError::NoColumns { .. })
        ));
        assert!(matches!(
            TableSchema::new("Overview", vec![ColumnDef::new("a", ColumnType::Text)]),
            Err(SchemaError::InvalidTableName(_))
        ));
        assert!(matches!(
            TableSchema::new("overview", vec![ColumnDef::new("1a", ColumnType::Text)]),
            Err(SchemaError::InvalidColumnName { .. })
        ));
    }
}
