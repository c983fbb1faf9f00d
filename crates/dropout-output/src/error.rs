//! Output error types.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to {operation} {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to {operation} table file {path}")]
    Table {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("failed to {operation} manifest {path}")]
    Manifest {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path} is not a dropout snapshot: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    #[error("snapshot version {found} is not supported (maximum: {max_supported}): {path}")]
    UnsupportedVersion {
        found: u32,
        max_supported: u32,
        path: PathBuf,
    },

    #[error("table file {path} does not match its manifest hash")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("table file {path} does not match its manifest: {reason}")]
    SchemaMismatch { path: PathBuf, reason: String },

    #[error("test fraction must be strictly between 0 and 1, got {fraction}")]
    InvalidFraction { fraction: f64 },

    #[error("failed to split table")]
    Split {
        #[source]
        source: PolarsError,
    },
}

impl OutputError {
    /// Adapter for `map_err` on I/O results.
    pub(crate) fn io(
        operation: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| OutputError::Io {
            operation,
            path,
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OutputError>;
