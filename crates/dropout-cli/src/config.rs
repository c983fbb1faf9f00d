//! Run configuration: an optional TOML file overlaid by CLI flags.
//!
//! ```toml
//! [source]
//! dir = "data/aact"
//! extension = "txt"
//! delimiter = "|"
//!
//! [features]
//! top_k = 5
//!
//! [assembly]
//! max_drop_ratio = 1.0
//!
//! [split]
//! test_fraction = 0.25
//! seed = 42
//!
//! [output]
//! dir = "output"
//!
//! [analysis]
//! histogram_bins = 20
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use dropout_analysis::DEFAULT_HISTOGRAM_BINS;
use dropout_core::{DEFAULT_MAX_DROP_RATIO, DEFAULT_TOP_K};
use dropout_ingest::{DEFAULT_DELIMITER, DEFAULT_EXTENSION};
use dropout_output::DEFAULT_TEST_FRACTION;

use crate::cli::Cli;

pub const DEFAULT_CONFIG_FILE: &str = "dropout.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropoutConfig {
    pub source: SourceConfig,
    pub features: FeatureConfig,
    pub assembly: AssemblyConfig,
    pub split: SplitConfig,
    pub output: OutputConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory of AACT flat-file exports.
    pub dir: PathBuf,
    pub extension: String,
    /// Single-byte field delimiter.
    pub delimiter: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            extension: DEFAULT_EXTENSION.to_string(),
            delimiter: char::from(DEFAULT_DELIMITER).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub top_k: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    pub max_drop_ratio: f64,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            max_drop_ratio: DEFAULT_MAX_DROP_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub test_fraction: f64,
    pub seed: Option<u64>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_fraction: DEFAULT_TEST_FRACTION,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub histogram_bins: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

impl DropoutConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("parse configuration")
    }

    /// Reads `path`, or `./dropout.toml` when no path is given.
    ///
    /// A missing default file yields the defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !explicit && !path.is_file() {
            debug!("no configuration file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("read configuration {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("load configuration {}", path.display()))?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Applies CLI overrides on top of the file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(dir) = &cli.source_dir {
            self.source.dir.clone_from(dir);
        }
        if let Some(dir) = &cli.output_dir {
            self.output.dir.clone_from(dir);
        }
        if let Some(top_k) = cli.top_k {
            self.features.top_k = top_k;
        }
        if let Some(ratio) = cli.max_drop_ratio {
            self.assembly.max_drop_ratio = ratio;
        }
        if let Some(fraction) = cli.test_fraction {
            self.split.test_fraction = fraction;
        }
        if cli.seed.is_some() {
            self.split.seed = cli.seed;
        }
    }

    /// The delimiter as a byte; it must be a single ASCII character.
    pub fn delimiter(&self) -> Result<u8> {
        match self.source.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => bail!(
                "delimiter must be a single ASCII character, got '{}'",
                self.source.delimiter
            ),
        }
    }
}
