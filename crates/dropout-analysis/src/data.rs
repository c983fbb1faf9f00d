//! Numeric views of modeling-table columns.

use polars::prelude::DataFrame;

use dropout_common::f64_values;
use dropout_model::TableSchema;

use crate::error::{AnalysisError, Result};

/// Reads a column as floats. Booleans map to 0/1.
pub fn numeric_column(frame: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
    if frame.column(column).is_err() {
        return Err(AnalysisError::MissingColumn {
            column: column.to_string(),
        });
    }
    Ok(f64_values(frame, column)?)
}

/// Explanatory columns in schema order.
pub fn predictor_names(schema: &TableSchema) -> Vec<&str> {
    schema
        .predictor_columns()
        .map(|column| column.name.as_str())
        .collect()
}
