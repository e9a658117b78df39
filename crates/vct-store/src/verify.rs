//! Post-import audit of the whole store.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::{debug, info_span};

use crate::error::Result;
use crate::store::{ColumnInfo, Store};

/// Tables with more columns than this are flagged as possible mis-parses.
pub const MANY_COLUMNS_THRESHOLD: usize = 50;

/// Tables sampled when no explicit sample list is given.
pub const DEFAULT_SAMPLE_TABLES: &[&str] = &[
    "vct_2025_matches_overview",
    "vct_2024_agents_agents_pick_rates",
    "vct_2023_matches_scores",
];

/// Grouping used when listing tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableCategory {
    IdMappings,
    Agents,
    Matches,
    Players,
    Other,
}

impl TableCategory {
    /// Categorizes by keyword; the first matching rule wins.
    pub fn from_table_name(name: &str) -> Self {
        if name.contains("ids") {
            Self::IdMappings
        } else if name.contains("agent") {
            Self::Agents
        } else if ["match", "eco", "kill"].iter().any(|k| name.contains(k)) {
            Self::Matches
        } else if name.contains("player") {
            Self::Players
        } else {
            Self::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::IdMappings => "ID Mappings",
            Self::Agents => "Agent Data",
            Self::Matches => "Match Data",
            Self::Players => "Player Stats",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for TableCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A suspicious property of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    Empty,
    ManyColumns { count: usize },
    SingleColumn,
    MetadataMismatch { recorded: u64, actual: u64 },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty table"),
            Self::ManyColumns { count } => write!(f, "Many columns ({count})"),
            Self::SingleColumn => write!(f, "Only one column"),
            Self::MetadataMismatch { recorded, actual } => {
                write!(f, "Recorded {recorded} rows but holds {actual}")
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub name: String,
    pub category: TableCategory,
    pub rows: u64,
    pub columns: Vec<ColumnInfo>,
    pub anomalies: Vec<Anomaly>,
}

impl TableReport {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Everything the verifier found.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub db_size_bytes: u64,
    pub total_rows: u64,
    pub tables: Vec<TableReport>,
}

impl VerifyReport {
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Tables grouped by category, each group in name order.
    pub fn by_category(&self) -> BTreeMap<TableCategory, Vec<&TableReport>> {
        let mut groups: BTreeMap<TableCategory, Vec<&TableReport>> = BTreeMap::new();
        for table in &self.tables {
            groups.entry(table.category).or_default().push(table);
        }
        groups
    }

    /// Every (table, anomaly) pair in table order.
    pub fn issues(&self) -> Vec<(&str, &Anomaly)> {
        self.tables
            .iter()
            .flat_map(|t| t.anomalies.iter().map(move |a| (t.name.as_str(), a)))
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.tables.iter().all(|t| t.anomalies.is_empty())
    }
}

fn column_anomalies(column_count: usize) -> Option<Anomaly> {
    if column_count > MANY_COLUMNS_THRESHOLD {
        Some(Anomaly::ManyColumns {
            count: column_count,
        })
    } else if column_count == 1 {
        Some(Anomaly::SingleColumn)
    } else {
        None
    }
}

/// Audits every user table in the store.
pub fn verify(store: &Store) -> Result<VerifyReport> {
    let _span = info_span!("verify", db = %store.path().display()).entered();

    let records: BTreeMap<String, u64> = store
        .import_records()?
        .into_iter()
        .map(|r| (r.table_name, r.row_count))
        .collect();

    let mut tables = Vec::new();
    let mut total_rows = 0u64;
    for name in store.list_tables()? {
        let rows = store.row_count(&name)?;
        let columns = store.table_columns(&name)?;
        total_rows += rows;

        let mut anomalies = Vec::new();
        if rows == 0 {
            anomalies.push(Anomaly::Empty);
        }
        if let Some(anomaly) = column_anomalies(columns.len()) {
            anomalies.push(anomaly);
        }
        if let Some(&recorded) = records.get(&name)
            && recorded != rows
        {
            anomalies.push(Anomaly::MetadataMismatch {
                recorded,
                actual: rows,
            });
        }
        debug!(table = %name, rows, columns = columns.len(), anomalies = anomalies.len(), "table checked");

        tables.push(TableReport {
            category: TableCategory::from_table_name(&name),
            name,
            rows,
            columns,
            anomalies,
        });
    }

    Ok(VerifyReport {
        db_size_bytes: store.file_size(),
        total_rows,
        tables,
    })
}
