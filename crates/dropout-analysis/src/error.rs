use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("column '{column}' not found in modeling table")]
    MissingColumn { column: String },

    #[error("no complete observations to fit (need at least one row with every {columns} column present)")]
    NoObservations { columns: usize },

    #[error("least-squares solve failed: {message}")]
    Solver { message: &'static str },

    #[error("histogram needs at least one bin")]
    NoBins,

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
