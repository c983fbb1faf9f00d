//! Ordinary least squares of `droprate` on the predictor columns.
//!
//! The design matrix is an intercept plus every predictor, restricted to
//! complete-case rows. Columns are admitted left to right; a column that does
//! not raise the numerical rank of the admitted set is aliased and gets no
//! coefficient. The admitted columns are then solved by SVD.

use nalgebra::{DMatrix, DVector};
use polars::prelude::DataFrame;
use tracing::{debug, info};

use dropout_model::TableSchema;
use dropout_model::schema::DROPRATE;

use crate::data::{numeric_column, predictor_names};
use crate::error::{AnalysisError, Result};

pub const INTERCEPT: &str = "intercept";
/// Singular values below this fraction of the largest count as zero.
const RANK_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, PartialEq)]
pub struct Coefficient {
    pub term: String,
    /// `None` for aliased terms.
    pub estimate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub coefficients: Vec<Coefficient>,
    pub r_squared: Option<f64>,
    pub observations: usize,
}

impl OlsFit {
    pub fn aliased(&self) -> impl Iterator<Item = &str> {
        self.coefficients
            .iter()
            .filter(|coefficient| coefficient.estimate.is_none())
            .map(|coefficient| coefficient.term.as_str())
    }

    pub fn estimate(&self, term: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|coefficient| coefficient.term == term)
            .and_then(|coefficient| coefficient.estimate)
    }

    fn predictors(&self) -> impl Iterator<Item = &Coefficient> {
        self.coefficients
            .iter()
            .filter(|coefficient| coefficient.term != INTERCEPT)
    }

    /// Predicted `droprate` per row; `None` where a used predictor is missing.
    pub fn predict(&self, frame: &DataFrame) -> Result<Vec<Option<f64>>> {
        let intercept = self.estimate(INTERCEPT).unwrap_or(0.0);
        let mut predictions = vec![Some(intercept); frame.height()];
        for coefficient in self.predictors() {
            let Some(estimate) = coefficient.estimate else {
                continue;
            };
            let values = numeric_column(frame, &coefficient.term)?;
            for (prediction, value) in predictions.iter_mut().zip(values) {
                *prediction = match (*prediction, value) {
                    (Some(sum), Some(value)) => Some(sum + estimate * value),
                    _ => None,
                };
            }
        }
        Ok(predictions)
    }

    /// Out-of-sample R² on `frame`, using that frame's own mean response.
    pub fn r_squared_on(&self, frame: &DataFrame) -> Result<Option<f64>> {
        let observed = numeric_column(frame, DROPRATE)?;
        let predicted = self.predict(frame)?;
        let pairs: Vec<(f64, f64)> = observed
            .into_iter()
            .zip(predicted)
            .filter_map(|(y, fitted)| Some((y?, fitted?)))
            .collect();
        Ok(r_squared(&pairs))
    }
}

/// `1 - SSres / SStot`, or `None` without variation in the response.
fn r_squared(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    let mean = pairs.iter().map(|(y, _)| y).sum::<f64>() / pairs.len() as f64;
    let total: f64 = pairs.iter().map(|(y, _)| (y - mean).powi(2)).sum();
    let residual: f64 = pairs.iter().map(|(y, fitted)| (y - fitted).powi(2)).sum();
    if total <= 0.0 {
        return None;
    }
    Some(1.0 - residual / total)
}

fn design_matrix(columns: &[Vec<f64>], picked: &[usize], rows: usize) -> DMatrix<f64> {
    DMatrix::from_fn(rows, picked.len(), |row, col| columns[picked[col]][row])
}

/// Rank of `matrix` with singular values cut at [`RANK_TOLERANCE`].
fn numerical_rank(matrix: &DMatrix<f64>) -> usize {
    let singular = matrix.singular_values();
    let largest = singular.iter().copied().fold(0.0, f64::max);
    if largest <= 0.0 {
        return 0;
    }
    singular
        .iter()
        .filter(|&&value| value > RANK_TOLERANCE * largest)
        .count()
}

/// Least-squares solution of `columns * beta = y` with aliased columns set
/// to `None`. `columns` are the design-matrix columns.
///
/// Rank is judged on unit-norm copies of the columns.
pub fn least_squares(columns: &[Vec<f64>], y: &[f64]) -> Result<Vec<Option<f64>>> {
    let rows = y.len();
    let unit: Vec<Vec<f64>> = columns
        .iter()
        .map(|column| {
            let norm = column.iter().map(|value| value * value).sum::<f64>().sqrt();
            if norm > 0.0 {
                column.iter().map(|value| value / norm).collect()
            } else {
                column.clone()
            }
        })
        .collect();

    let mut accepted: Vec<usize> = Vec::new();
    for idx in 0..columns.len() {
        let mut candidate = accepted.clone();
        candidate.push(idx);
        let rank = numerical_rank(&design_matrix(&unit, &candidate, rows));
        if rank == candidate.len() {
            accepted = candidate;
        } else {
            debug!(column = idx, "aliased column");
        }
    }

    let mut estimates = vec![None; columns.len()];
    if accepted.is_empty() {
        return Ok(estimates);
    }
    let beta = design_matrix(columns, &accepted, rows)
        .svd(true, true)
        .solve(&DVector::from_column_slice(y), 0.0)
        .map_err(|message| AnalysisError::Solver { message })?;
    for (slot, value) in accepted.into_iter().zip(beta.iter()) {
        estimates[slot] = Some(*value);
    }
    Ok(estimates)
}

/// Fits `droprate ~ intercept + predictors` over complete-case rows.
pub fn fit_ols(frame: &DataFrame, schema: &TableSchema) -> Result<OlsFit> {
    let names = predictor_names(schema);
    let response = numeric_column(frame, DROPRATE)?;
    let predictors = names
        .iter()
        .map(|name| numeric_column(frame, name))
        .collect::<Result<Vec<_>>>()?;

    let complete: Vec<usize> = (0..frame.height())
        .filter(|&row| {
            response[row].is_some() && predictors.iter().all(|column| column[row].is_some())
        })
        .collect();
    if complete.is_empty() {
        return Err(AnalysisError::NoObservations {
            columns: names.len() + 1,
        });
    }

    let y: Vec<f64> = complete
        .iter()
        .map(|&row| response[row].unwrap_or_default())
        .collect();
    let mut columns = vec![vec![1.0; complete.len()]];
    for column in &predictors {
        columns.push(
            complete
                .iter()
                .map(|&row| column[row].unwrap_or_default())
                .collect(),
        );
    }

    let estimates = least_squares(&columns, &y)?;
    let coefficients: Vec<Coefficient> = std::iter::once(INTERCEPT)
        .chain(names.iter().copied())
        .zip(estimates)
        .map(|(term, estimate)| Coefficient {
            term: term.to_string(),
            estimate,
        })
        .collect();

    let fitted: Vec<(f64, f64)> = (0..y.len())
        .map(|row| {
            let prediction: f64 = columns
                .iter()
                .zip(&coefficients)
                .map(|(column, coefficient)| column[row] * coefficient.estimate.unwrap_or(0.0))
                .sum();
            (y[row], prediction)
        })
        .collect();
    let fit = OlsFit {
        r_squared: r_squared(&fitted),
        observations: y.len(),
        coefficients,
    };
    info!(
        observations = fit.observations,
        terms = fit.coefficients.len(),
        aliased = fit.aliased().count(),
        "fitted least squares"
    );
    Ok(fit)
}
