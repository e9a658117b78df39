use std::io::{self, IsTerminal};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use indicatif::{HumanCount, ProgressBar, ProgressStyle};
use tracing::{info_span, warn};

use vct_ingest::parse_encoding_label;
use vct_model::ImportSummary;
use vct_store::{DEFAULT_SAMPLE_TABLES, LoadOptions, Store, TableProvider, verify};

use crate::cli::{ImportArgs, ShowArgs, VerifyArgs};
use crate::pipeline::{FileSelection, ImportEvent, PipelineOptions, run_import};
use crate::summary::{print_frame, print_import_summary, print_verify_report};

/// Which import flavor a command runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Every CSV under the data directory.
    Full,
    /// The fixed list of known-large files.
    Large,
}

impl ImportMode {
    pub fn default_batch_size(self) -> usize {
        match self {
            Self::Full => 1000,
            Self::Large => 500,
        }
    }

    pub fn default_log_file(self) -> PathBuf {
        match self {
            Self::Full => PathBuf::from("import_log.txt"),
            Self::Large => PathBuf::from("import_large_log.txt"),
        }
    }

    fn selection(self) -> FileSelection {
        match self {
            Self::Full => FileSelection::Discover,
            Self::Large => FileSelection::large_files(),
        }
    }
}

pub fn run_import_command(args: &ImportArgs, mode: ImportMode) -> Result<ImportSummary> {
    let span = info_span!("import", mode = ?mode, data_dir = %args.data_dir.display());
    let _guard = span.enter();

    let options = pipeline_options(args, mode)?;
    let mut store =
        Store::open(&args.db).with_context(|| format!("open database {}", args.db.display()))?;

    let spinner = import_spinner();
    let summary = run_import(
        &mut store,
        &args.data_dir,
        &mode.selection(),
        &options,
        |event| {
            match event {
                ImportEvent::FileStarted {
                    index,
                    total,
                    source,
                } => spinner.set_message(format!("[{}/{total}] {}", index + 1, source.display())),
                ImportEvent::Window(progress) => spinner.set_message(format!(
                    "{}: {} rows",
                    progress.table,
                    HumanCount(progress.rows)
                )),
                ImportEvent::FileFinished(_) => spinner.tick(),
            }
            ControlFlow::Continue(())
        },
    )
    .with_context(|| format!("import from {}", args.data_dir.display()))?;
    spinner.finish_and_clear();

    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary).context("serialize run summary")?;
        std::fs::write(path, json)
            .with_context(|| format!("write run summary {}", path.display()))?;
    }
    print_import_summary(&summary);
    Ok(summary)
}

fn pipeline_options(args: &ImportArgs, mode: ImportMode) -> Result<PipelineOptions> {
    let mut encodings = Vec::with_capacity(args.encodings.len());
    for label in &args.encodings {
        match parse_encoding_label(label) {
            Some(encoding) => encodings.push(encoding),
            None => bail!("unsupported encoding label: {label}"),
        }
    }

    let load = LoadOptions::default()
        .with_batch_size(args.batch_size.unwrap_or(mode.default_batch_size()))
        .with_sample_rows(args.sample_rows)
        .with_commit_every(args.commit_every)
        .with_encodings(encodings);
    Ok(PipelineOptions::default()
        .with_load_options(load)
        .with_indexes(!args.no_indexes))
}

fn import_spinner() -> ProgressBar {
    if !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {elapsed:>4} {msg}") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

pub fn run_verify(args: &VerifyArgs) -> Result<()> {
    let mut provider = TableProvider::open(&args.db)
        .with_context(|| format!("open database {}", args.db.display()))?;
    let report = verify(provider.store()).context("verify database")?;
    print_verify_report(&report);

    let samples: Vec<String> = if args.sample.is_empty() {
        DEFAULT_SAMPLE_TABLES
            .iter()
            .filter(|name| report.table(name).is_some())
            .map(|name| (*name).to_string())
            .collect()
    } else {
        args.sample.clone()
    };
    for table in samples {
        match provider.fetch_table(&table, Some(args.sample_limit)) {
            Ok(frame) => {
                println!();
                print_frame(&format!("Sample data from {table}"), &frame);
            }
            Err(error) => warn!(table = %table, %error, "cannot read sample data"),
        }
    }
    Ok(())
}

pub fn run_show(args: &ShowArgs) -> Result<()> {
    let mut provider = TableProvider::open(&args.db)
        .with_context(|| format!("open database {}", args.db.display()))?;
    let frame = provider
        .fetch_table(&args.table, Some(args.limit))
        .with_context(|| format!("read table {}", args.table))?;
    print_frame(&args.table, &frame);
    Ok(())
}
