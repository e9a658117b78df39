//! Import orchestration: one pass over a set of source files.
//!
//! Every file is imported independently. A file that cannot be read or
//! written is recorded as failed and the run moves on; only problems with the
//! run itself (missing data root, unusable store) abort it.

use std::collections::{BTreeMap, HashMap};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, error, info, info_span, warn};
use vct_ingest::{IngestError, list_csv_files, table_name_for};
use vct_model::{FileOutcome, ImportRecord, ImportSummary, OutcomeStatus};
use vct_store::{BatchLoader, LoadOptions, LoadProgress, LoadStatus, Store};

/// Files known to be too large for a single-transaction import, relative to
/// the data root.
pub const LARGE_FILES: &[&str] = &[
    "all_ids/all_matches_games_ids.csv",
    "vct_2021/agents/agents_pick_rates.csv",
    "vct_2021/agents/teams_picked_agents.csv",
    "vct_2021/matches/eco_rounds.csv",
    "vct_2021/matches/eco_stats.csv",
    "vct_2021/matches/kills.csv",
    "vct_2021/matches/kills_stats.csv",
    "vct_2021/matches/overview.csv",
    "vct_2021/matches/rounds_kills.csv",
    "vct_2021/matches/win_loss_methods_count.csv",
    "vct_2021/matches/win_loss_methods_round_number.csv",
    "vct_2021/players_stats/players_stats.csv",
    "vct_2022/agents/agents_pick_rates.csv",
    "vct_2022/agents/teams_picked_agents.csv",
    "vct_2022/matches/eco_rounds.csv",
    "vct_2022/matches/eco_stats.csv",
    "vct_2022/matches/kills.csv",
    "vct_2022/matches/kills_stats.csv",
    "vct_2022/matches/overview.csv",
    "vct_2022/matches/rounds_kills.csv",
    "vct_2022/matches/win_loss_methods_round_number.csv",
    "vct_2022/players_stats/players_stats.csv",
    "vct_2023/matches/eco_rounds.csv",
    "vct_2023/matches/kills.csv",
    "vct_2023/matches/overview.csv",
    "vct_2023/matches/rounds_kills.csv",
    "vct_2023/matches/win_loss_methods_round_number.csv",
    "vct_2023/players_stats/players_stats.csv",
    "vct_2024/matches/eco_rounds.csv",
    "vct_2024/matches/kills.csv",
    "vct_2024/matches/overview.csv",
    "vct_2024/matches/rounds_kills.csv",
    "vct_2024/matches/win_loss_methods_round_number.csv",
    "vct_2024/players_stats/players_stats.csv",
    "vct_2025/matches/eco_rounds.csv",
    "vct_2025/matches/kills.csv",
    "vct_2025/matches/overview.csv",
    "vct_2025/matches/rounds_kills.csv",
    "vct_2025/matches/win_loss_methods_round_number.csv",
    "vct_2025/players_stats/players_stats.csv",
];

/// Which files a run processes.
#[derive(Debug, Clone)]
pub enum FileSelection {
    /// Every CSV below the root, in path order.
    Discover,
    /// The given root-relative paths, in the given order.
    Explicit(Vec<PathBuf>),
}

impl FileSelection {
    pub fn large_files() -> Self {
        Self::Explicit(LARGE_FILES.iter().map(PathBuf::from).collect())
    }

    fn resolve(&self, root: &Path) -> Result<Vec<PathBuf>, IngestError> {
        if !root.is_dir() {
            return Err(IngestError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        match self {
            Self::Discover => list_csv_files(root),
            Self::Explicit(paths) => Ok(paths.iter().map(|p| root.join(p)).collect()),
        }
    }
}

/// Options for one import run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub load: LoadOptions,
    /// Create lookup indexes after loading.
    /// Defaults to true.
    pub create_indexes: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            load: LoadOptions::default(),
            create_indexes: true,
        }
    }
}

impl PipelineOptions {
    pub fn with_load_options(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    pub fn with_indexes(mut self, enable: bool) -> Self {
        self.create_indexes = enable;
        self
    }
}

/// Progress notifications emitted during a run.
///
/// The callback's `ControlFlow` is honoured for [`ImportEvent::Window`]:
/// `Break` interrupts the current file, which is recorded as failed with its
/// committed checkpoints left in place. The run then moves on to the next
/// file. Other events ignore the returned value.
#[derive(Debug)]
pub enum ImportEvent<'a> {
    FileStarted {
        index: usize,
        total: usize,
        source: &'a Path,
    },
    Window(LoadProgress<'a>),
    FileFinished(&'a FileOutcome),
}

/// Imports the selected files under `root` into `store`.
///
/// Interrupted or failed files never get an import record, even when some of
/// their rows were committed.
///
/// # Errors
///
/// Fails only when the run cannot proceed: the root is not a directory, or
/// the metadata table cannot be written.
pub fn run_import<F>(
    store: &mut Store,
    root: &Path,
    selection: &FileSelection,
    options: &PipelineOptions,
    mut progress: F,
) -> vct_store::Result<ImportSummary>
where
    F: FnMut(&ImportEvent<'_>) -> ControlFlow<()>,
{
    let started_at = Utc::now().to_rfc3339();
    let files = selection.resolve(root)?;
    let total = files.len();
    info!(root = %root.display(), files = total, "import started");

    let mut outcomes: Vec<FileOutcome> = Vec::with_capacity(total);
    let mut claimed: HashMap<String, usize> = HashMap::new();
    {
        let mut loader = BatchLoader::new(store, options.load.clone());
        for (index, source) in files.iter().enumerate() {
            let span = info_span!("file", path = %source.display());
            let _guard = span.enter();
            let _ = progress(&ImportEvent::FileStarted {
                index,
                total,
                source,
            });

            let outcome = import_file(&mut loader, root, source, &mut progress);
            log_outcome(&outcome);

            if outcome.is_imported()
                && let Some(table) = outcome.table.clone()
                && let Some(previous) = claimed.insert(table.clone(), outcomes.len())
            {
                warn!(
                    table = %table,
                    earlier = %outcomes[previous].source.display(),
                    "two files map to the same table; the later file replaces the earlier one"
                );
                let earlier = &mut outcomes[previous];
                earlier.status = OutcomeStatus::Skipped {
                    reason: format!("superseded by {}", source.display()),
                };
            }

            let _ = progress(&ImportEvent::FileFinished(&outcome));
            outcomes.push(outcome);
        }
    }

    let import_timestamp = Utc::now().to_rfc3339();
    let records: BTreeMap<String, ImportRecord> = outcomes
        .iter()
        .filter_map(|outcome| match (&outcome.table, &outcome.status) {
            (Some(table), OutcomeStatus::Imported { rows, columns }) => Some((
                table.clone(),
                ImportRecord {
                    table_name: table.clone(),
                    source_file: outcome.source.display().to_string(),
                    row_count: *rows,
                    column_count: *columns,
                    import_timestamp: import_timestamp.clone(),
                },
            )),
            _ => None,
        })
        .collect();
    let records: Vec<ImportRecord> = records.into_values().collect();
    store.upsert_import_records(&records)?;

    let mut indexes_created = 0usize;
    if options.create_indexes {
        for record in &records {
            match store.create_lookup_indexes(&record.table_name) {
                Ok(created) => indexes_created += created.len(),
                Err(err) => warn!(table = %record.table_name, error = %err, "skipping indexes"),
            }
        }
    }

    if let Err(err) = store.checkpoint() {
        debug!(error = %err, "checkpoint failed");
    }

    let summary = ImportSummary {
        db_path: store.path().to_path_buf(),
        db_size_bytes: store.file_size(),
        started_at,
        finished_at: Utc::now().to_rfc3339(),
        indexes_created,
        outcomes,
    };
    info!(
        succeeded = summary.succeeded(),
        skipped = summary.skipped(),
        failed = summary.failed(),
        rows = summary.total_rows(),
        indexes = indexes_created,
        "import finished"
    );
    Ok(summary)
}

fn import_file<F>(
    loader: &mut BatchLoader<'_>,
    root: &Path,
    source: &Path,
    progress: &mut F,
) -> FileOutcome
where
    F: FnMut(&ImportEvent<'_>) -> ControlFlow<()>,
{
    if !source.is_file() {
        return FileOutcome::failed(source.to_path_buf(), None, "file not found");
    }
    let table = match table_name_for(source, root) {
        Ok(table) => table,
        Err(err) => return FileOutcome::failed(source.to_path_buf(), None, err.to_string()),
    };

    let result =
        loader.load_with_progress(source, &table, |window| progress(&ImportEvent::Window(*window)));
    match result {
        Ok(LoadStatus::Loaded(report)) => {
            FileOutcome::imported(source.to_path_buf(), table, report.rows, report.columns)
        }
        Ok(LoadStatus::Skipped { reason, .. }) => {
            FileOutcome::skipped(source.to_path_buf(), Some(table), reason)
        }
        Err(err) => FileOutcome::failed(source.to_path_buf(), Some(table), err.to_string()),
    }
}

fn log_outcome(outcome: &FileOutcome) {
    let table = outcome.table.as_deref().unwrap_or("-");
    match &outcome.status {
        OutcomeStatus::Imported { rows, columns } => {
            info!(table, rows, columns, "imported");
        }
        OutcomeStatus::Skipped { reason } => {
            info!(table, reason = %reason, "skipped");
        }
        OutcomeStatus::Failed { reason } => {
            error!(table, path = %outcome.source.display(), reason = %reason, "import failed");
        }
    }
}
