//! Per-file outcomes and run summaries.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What happened to a single source file during an import run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Table was (re)created and loaded.
    Imported { rows: u64, columns: usize },
    /// File had no data rows; no table was created.
    Skipped { reason: String },
    /// File could not be read or written; later files were still processed.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    /// Destination table, when a name could be derived.
    pub table: Option<String>,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl FileOutcome {
    pub fn imported(source: PathBuf, table: String, rows: u64, columns: usize) -> Self {
        Self {
            source,
            table: Some(table),
            status: OutcomeStatus::Imported { rows, columns },
        }
    }

    pub fn skipped(source: PathBuf, table: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            source,
            table,
            status: OutcomeStatus::Skipped {
                reason: reason.into(),
            },
        }
    }

    pub fn failed(source: PathBuf, table: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            source,
            table,
            status: OutcomeStatus::Failed {
                reason: reason.into(),
            },
        }
    }

    pub fn is_imported(&self) -> bool {
        matches!(self.status, OutcomeStatus::Imported { .. })
    }

    pub fn rows(&self) -> u64 {
        match self.status {
            OutcomeStatus::Imported { rows, .. } => rows,
            _ => 0,
        }
    }
}

/// Aggregated result of one import run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportSummary {
    pub db_path: PathBuf,
    pub db_size_bytes: u64,
    pub started_at: String,
    pub finished_at: String,
    pub indexes_created: usize,
    pub outcomes: Vec<FileOutcome>,
}

impl ImportSummary {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_imported()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, OutcomeStatus::Failed { .. }))
            .count()
    }

    pub fn total_rows(&self) -> u64 {
        self.outcomes.iter().map(FileOutcome::rows).sum()
    }

    /// Imported outcomes ordered by table name.
    pub fn imported_tables(&self) -> Vec<&FileOutcome> {
        let mut imported: Vec<&FileOutcome> =
            self.outcomes.iter().filter(|o| o.is_imported()).collect();
        imported.sort_by(|a, b| a.table.cmp(&b.table));
        imported
    }
}
