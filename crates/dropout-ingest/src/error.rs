//! Error types for source-table ingestion.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while fetching a source table.
///
/// Every variant names the table involved so a failed run points at the
/// table (and column) that could not be read.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The source has no table with this name.
    #[error("table '{table}' not found in source")]
    MissingTable { table: String },

    /// The table exists but lacks a requested column.
    #[error("column '{column}' not found in table '{table}'")]
    MissingColumn { table: String, column: String },

    /// Failed to open or read the file backing a table.
    #[error("failed to read table '{table}' from {path}: {source}")]
    Io {
        table: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file backing a table could not be parsed.
    #[error("failed to parse table '{table}' from {path}: {message}")]
    Parse {
        table: String,
        path: PathBuf,
        message: String,
    },

    /// Any other failure reported by the source.
    #[error("failed to fetch table '{table}': {message}")]
    Fetch { table: String, message: String },
}

impl IngestError {
    /// Name of the table the error refers to.
    pub fn table(&self) -> &str {
        match self {
            Self::MissingTable { table }
            | Self::MissingColumn { table, .. }
            | Self::Io { table, .. }
            | Self::Parse { table, .. }
            | Self::Fetch { table, .. } => table,
        }
    }

    pub(crate) fn fetch(table: &str, err: impl std::fmt::Display) -> Self {
        Self::Fetch {
            table: table.to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::MissingColumn {
            table: "milestones".to_string(),
            column: "title".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "column 'title' not found in table 'milestones'"
        );
        assert_eq!(err.table(), "milestones");
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("count".into());
        let err = IngestError::fetch("drop_withdrawals", polars_err);
        assert!(matches!(err, IngestError::Fetch { .. }));
        assert_eq!(err.table(), "drop_withdrawals");
    }
}
