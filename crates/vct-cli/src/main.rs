//! VCT statistics store CLI.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{ColorChoice, Parser};
use tracing::error;
use tracing::level_filters::LevelFilter;

use vct_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use vct_cli::commands::{ImportMode, run_import_command, run_show, run_verify};
use vct_cli::logging::{LogConfig, LogFormat, init_logging};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }

    let result = match &cli.command {
        Command::Import(args) => run_import_command(args, ImportMode::Full).map(|_| ()),
        Command::ImportLarge(args) => run_import_command(args, ImportMode::Large).map(|_| ()),
        Command::Verify(args) => run_verify(args),
        Command::Show(args) => run_show(args),
    };
    let exit_code = match result {
        Ok(()) => 0,
        Err(err) => {
            let message = format!("{err:#}");
            error!(error = %message, "command failed");
            eprintln!("error: {message}");
            1
        }
    };
    std::process::exit(exit_code);
}

/// Import commands log to a file by default; the others only to stderr.
fn default_log_file(command: &Command) -> Option<PathBuf> {
    match command {
        Command::Import(_) => Some(ImportMode::Full.default_log_file()),
        Command::ImportLarge(_) => Some(ImportMode::Large.default_log_file()),
        Command::Verify(_) | Command::Show(_) => None,
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli
        .log_file
        .clone()
        .or_else(|| default_log_file(&cli.command));
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => io::stderr().is_terminal(),
    };
    config
}
