//! CLI argument definitions.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{ColorChoice, Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use crate::logging::{LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "dropout",
    version,
    about = "Build and analyze a clinical-trial dropout modeling table",
    long_about = "Build a per-study modeling table of participant dropout from AACT \
                  registry exports.\n\n\
                  --getdata assembles the table from flat files, --loaddata reads a \
                  saved snapshot instead. --plot and --fit run the built-in \
                  exploratory summary and least-squares fit on whichever table is \
                  available."
)]
pub struct Cli {
    /// Assemble a new modeling table from the source tables.
    #[arg(long)]
    pub getdata: bool,

    /// Save the assembled table and its training/testing partitions.
    #[arg(long)]
    pub savedata: bool,

    /// Load a saved snapshot instead of assembling (takes precedence over --getdata).
    #[arg(long, value_name = "PATH")]
    pub loaddata: Option<PathBuf>,

    /// Print the dropout-rate histogram and predictor correlations.
    #[arg(long)]
    pub plot: bool,

    /// Fit droprate on every predictor by ordinary least squares.
    #[arg(long)]
    pub fit: bool,

    /// Configuration file (default: ./dropout.toml when present).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the AACT flat-file exports.
    #[arg(long = "source-dir", value_name = "DIR")]
    pub source_dir: Option<PathBuf>,

    /// Directory for snapshots and partitions.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Reuse the vocabularies recorded in a snapshot or manifest.
    #[arg(long, value_name = "PATH")]
    pub vocabulary: Option<PathBuf>,

    /// Terms kept per categorical field.
    #[arg(long = "top-k", value_name = "K")]
    pub top_k: Option<usize>,

    /// Remove studies with dropped >= enrolled * RATIO.
    #[arg(long = "max-drop-ratio", value_name = "RATIO")]
    pub max_drop_ratio: Option<f64>,

    /// Fraction of rows held out for testing.
    #[arg(long = "test-fraction", value_name = "FRACTION")]
    pub test_fraction: Option<f64>,

    /// Seed for the holdout split (random when omitted).
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

impl Cli {
    /// Logging setup requested by the flags.
    ///
    /// `--log-level` beats `-v`/`-q`; `RUST_LOG` applies only when neither
    /// was given. ANSI output is off whenever logs go to a file.
    pub fn log_config(&self) -> LogConfig {
        let explicit = self.verbosity.is_present() || self.log_level.is_some();
        LogConfig {
            level_filter: self
                .log_level
                .map_or_else(|| self.verbosity.tracing_level_filter(), LevelFilter::from),
            use_env_filter: !explicit,
            format: self.log_format.into(),
            log_file: self.log_file.clone(),
            with_ansi: match self.color.color {
                ColorChoice::Always => true,
                ColorChoice::Never => false,
                ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
            },
            ..LogConfig::default()
        }
    }
}
