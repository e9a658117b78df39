//! CLI argument definitions for the VCT importer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "vct",
    version,
    about = "VCT statistics store - import tournament CSV exports into SQLite",
    long_about = "Import VCT tournament statistics CSV exports into a single SQLite database.\n\n\
                  Every CSV becomes one table named after its location under the data\n\
                  directory. Column types are inferred from a sample of rows, and every\n\
                  import is recorded in the import_metadata table."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Also write logs to this file (import commands default to a log file
    /// in the working directory).
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import every CSV file found under the data directory.
    Import(ImportArgs),

    /// Import the known-large files in smaller batches.
    ImportLarge(ImportArgs),

    /// Audit the database and report suspicious tables.
    Verify(VerifyArgs),

    /// Print the first rows of one table.
    Show(ShowArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    /// Root directory holding the CSV exports.
    #[arg(long = "data-dir", value_name = "DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// SQLite database file (created when missing).
    #[arg(long = "db", value_name = "PATH", default_value = "vct.db")]
    pub db: PathBuf,

    /// Rows per insert batch (default: 1000, or 500 for import-large).
    #[arg(long = "batch-size", value_name = "ROWS")]
    pub batch_size: Option<usize>,

    /// Data rows sampled for column type inference.
    #[arg(long = "sample-rows", value_name = "ROWS", default_value_t = 1000)]
    pub sample_rows: usize,

    /// Batches per committed transaction.
    #[arg(long = "commit-every", value_name = "BATCHES", default_value_t = 10)]
    pub commit_every: usize,

    /// Candidate text encodings, tried in order.
    #[arg(
        long = "encodings",
        value_name = "LABELS",
        value_delimiter = ',',
        default_value = "utf-8,windows-1252"
    )]
    pub encodings: Vec<String>,

    /// Skip creating lookup indexes.
    #[arg(long = "no-indexes")]
    pub no_indexes: bool,

    /// Write the run summary as JSON to this path.
    #[arg(long = "summary-json", value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}

#[derive(Args)]
pub struct VerifyArgs {
    /// SQLite database file.
    #[arg(long = "db", value_name = "PATH", default_value = "vct.db")]
    pub db: PathBuf,

    /// Tables to print sample rows from (repeatable).
    #[arg(long = "sample", value_name = "TABLE")]
    pub sample: Vec<String>,

    /// Rows shown per sampled table.
    #[arg(long = "sample-limit", value_name = "ROWS", default_value_t = 3)]
    pub sample_limit: usize,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Table to print.
    #[arg(value_name = "TABLE")]
    pub table: String,

    /// SQLite database file.
    #[arg(long = "db", value_name = "PATH", default_value = "vct.db")]
    pub db: PathBuf,

    /// Maximum rows to print.
    #[arg(long = "limit", value_name = "ROWS", default_value_t = 20)]
    pub limit: usize,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
