//! Read-only table access for presentation code.
//!
//! [`TableProvider`] is the only read interface dashboards and reports need:
//! list the tables, fetch one as a [`DataFrame`], and resolve the column
//! naming drift between tournament years with [`find_column`] and
//! [`missing_columns`].

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use rusqlite::types::Value;
use tracing::{debug, trace};
use vct_model::ColumnType;

use crate::error::{Result, StoreError};
use crate::sql::select_sql;
use crate::store::Store;

struct CachedFrame {
    /// Row limit the frame was fetched with (`None` = whole table).
    limit: Option<usize>,
    frame: DataFrame,
}

impl CachedFrame {
    fn covers(&self, limit: Option<usize>) -> bool {
        match (self.limit, limit) {
            (None, _) => true,
            (Some(cached), Some(wanted)) if wanted <= cached => true,
            // A short read already holds the whole table.
            (Some(cached), _) => self.frame.height() < cached,
        }
    }

    fn view(&self, limit: Option<usize>) -> DataFrame {
        match limit {
            Some(limit) if limit < self.frame.height() => self.frame.head(Some(limit)),
            _ => self.frame.clone(),
        }
    }
}

/// Read-only, cached access to the store's tables.
pub struct TableProvider {
    store: Store,
    cache: HashMap<String, CachedFrame>,
}

impl TableProvider {
    /// Opens the database at `path` read-only.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::from_store(Store::open_read_only(path)?))
    }

    pub fn from_store(store: Store) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Data tables in name order.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.store.list_tables()
    }

    /// Fetches a table (or its first `limit` rows) as a data frame.
    ///
    /// Frames are cached per table until [`invalidate`](Self::invalidate) or
    /// [`refresh`](Self::refresh) is called.
    pub fn fetch_table(&mut self, name: &str, limit: Option<usize>) -> Result<DataFrame> {
        if let Some(cached) = self.cache.get(name)
            && cached.covers(limit)
        {
            trace!(table = name, "frame served from cache");
            return Ok(cached.view(limit));
        }

        if !self.list_tables()?.iter().any(|t| t == name) {
            return Err(StoreError::UnknownTable(name.to_string()));
        }
        let frame = read_frame(&self.store, name, limit)?;
        debug!(table = name, rows = frame.height(), "frame loaded");
        self.cache.insert(
            name.to_string(),
            CachedFrame {
                limit,
                frame: frame.clone(),
            },
        );
        Ok(frame)
    }

    /// Drops one cached frame. Returns whether it was cached.
    pub fn invalidate(&mut self, name: &str) -> bool {
        self.cache.remove(name).is_some()
    }

    /// Drops every cached frame.
    pub fn refresh(&mut self) {
        self.cache.clear();
    }

    pub fn cached_tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.cache.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn read_frame(store: &Store, table: &str, limit: Option<usize>) -> Result<DataFrame> {
    let declared = store.table_columns(table)?;
    let mut stmt = store.connection().prepare(&select_sql(table, limit))?;
    let width = stmt.column_count();

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); width];
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        for (idx, column) in values.iter_mut().enumerate() {
            column.push(row.get::<_, Value>(idx)?);
        }
    }

    let columns = declared
        .iter()
        .zip(values)
        .map(|(info, column)| build_column(&info.name, info.column_type(), column))
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Picks a dtype from the stored values, falling back to the declared type
/// when the column holds only NULLs.
fn build_column(name: &str, declared: ColumnType, values: Vec<Value>) -> Column {
    let mut saw_value = false;
    let mut all_integer = true;
    let mut all_numeric = true;
    for value in &values {
        match value {
            Value::Null => {}
            Value::Integer(_) => saw_value = true,
            Value::Real(_) => {
                saw_value = true;
                all_integer = false;
            }
            Value::Text(_) | Value::Blob(_) => {
                saw_value = true;
                all_integer = false;
                all_numeric = false;
            }
        }
    }
    let column_type = if !saw_value {
        declared
    } else if all_integer {
        ColumnType::Integer
    } else if all_numeric {
        ColumnType::Real
    } else {
        ColumnType::Text
    };

    let series = match column_type {
        ColumnType::Integer => {
            let data: Vec<Option<i64>> = values
                .into_iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(i),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), data)
        }
        ColumnType::Real => {
            let data: Vec<Option<f64>> = values
                .into_iter()
                .map(|v| match v {
                    Value::Integer(i) => Some(i as f64),
                    Value::Real(r) => Some(r),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), data)
        }
        ColumnType::Text => {
            let data: Vec<Option<String>> = values.into_iter().map(value_to_string).collect();
            Series::new(name.into(), data)
        }
    };
    series.into()
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(r) => Some(r.to_string()),
        Value::Text(text) => Some(text),
        Value::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// First candidate that names a column of `df`.
///
/// Returns `None` for an empty frame.
pub fn find_column<'a>(df: &DataFrame, candidates: &[&'a str]) -> Option<&'a str> {
    if df.height() == 0 {
        return None;
    }
    candidates
        .iter()
        .copied()
        .find(|candidate| df.column(candidate).is_ok())
}

/// Describes each requirement with no matching column.
///
/// `required` pairs a description with the column names that satisfy it.
pub fn missing_columns(df: &DataFrame, required: &[(&str, &[&str])]) -> Vec<String> {
    required
        .iter()
        .filter(|(_, candidates)| find_column(df, candidates).is_none())
        .map(|(description, candidates)| format!("{description} (tried: {})", candidates.join(", ")))
        .collect()
}

/// Tournament years present, parsed from `vct_<year>_` table prefixes.
pub fn available_years<S: AsRef<str>>(tables: &[S]) -> Vec<i32> {
    tables
        .iter()
        .filter_map(|table| {
            let rest = table.as_ref().strip_prefix("vct_")?;
            let year = rest.split('_').next()?;
            year.parse::<i32>().ok()
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
