//! Consumers of the modeling table: an exploratory summary of the dropout
//! rate and a least-squares fit of it on the predictor columns.
//!
//! Both read the table as a polars frame together with its
//! [`TableSchema`](dropout_model::TableSchema), which decides which columns
//! are predictors.

pub mod data;
pub mod error;
pub mod explore;
pub mod ols;

pub use error::{AnalysisError, Result};
pub use explore::{
    Bin, Correlation, DEFAULT_HISTOGRAM_BINS, ExploreSummary, Histogram, explore, pearson,
    rate_histogram,
};
pub use ols::{Coefficient, INTERCEPT, OlsFit, fit_ols, least_squares};
