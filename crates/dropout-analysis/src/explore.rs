//! Exploratory summaries: dropout-rate histogram and correlations.

use polars::prelude::cov::pearson_corr;
use polars::prelude::{DataFrame, Float64Chunked, PlSmallStr};

use dropout_model::TableSchema;
use dropout_model::schema::DROPRATE;

use crate::data::{numeric_column, predictor_names};
use crate::error::{AnalysisError, Result};

pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram over `[0, 1]`. The last bin includes 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bins: Vec<Bin>,
    pub missing: usize,
    pub out_of_range: usize,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).sum()
    }
}

pub fn rate_histogram(values: &[Option<f64>], bins: usize) -> Result<Histogram> {
    if bins == 0 {
        return Err(AnalysisError::NoBins);
    }
    let width = 1.0 / bins as f64;
    let mut counts = vec![0usize; bins];
    let mut missing = 0;
    let mut out_of_range = 0;
    for value in values {
        match value {
            None => missing += 1,
            Some(rate) if !(0.0..=1.0).contains(rate) => out_of_range += 1,
            Some(rate) => {
                let slot = ((rate / width) as usize).min(bins - 1);
                counts[slot] += 1;
            }
        }
    }
    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| Bin {
            lower: idx as f64 * width,
            upper: (idx + 1) as f64 * width,
            count,
        })
        .collect();
    Ok(Histogram {
        bins,
        missing,
        out_of_range,
    })
}

/// Pearson correlation over rows where both values are present.
///
/// `None` with fewer than two such rows or when either side is constant.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> (Option<f64>, usize) {
    let (x, y): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    let n = x.len();
    if n < 2 {
        return (None, n);
    }
    let x = Float64Chunked::from_vec(PlSmallStr::from_static("x"), x);
    let y = Float64Chunked::from_vec(PlSmallStr::from_static("y"), y);
    let r = pearson_corr(&x, &y).filter(|r| r.is_finite());
    (r, n)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Correlation {
    pub column: String,
    pub r: Option<f64>,
    pub observations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExploreSummary {
    pub rows: usize,
    pub histogram: Histogram,
    pub correlations: Vec<Correlation>,
}

/// Histogram of `droprate` plus its correlation with every predictor.
pub fn explore(frame: &DataFrame, schema: &TableSchema, bins: usize) -> Result<ExploreSummary> {
    let rates = numeric_column(frame, DROPRATE)?;
    let histogram = rate_histogram(&rates, bins)?;
    let mut correlations = Vec::new();
    for column in predictor_names(schema) {
        let values = numeric_column(frame, column)?;
        let (r, observations) = pearson(&values, &rates);
        correlations.push(Correlation {
            column: column.to_string(),
            r,
            observations,
        });
    }
    Ok(ExploreSummary {
        rows: frame.height(),
        histogram,
        correlations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_edges() {
        let values = [Some(0.0), Some(0.49), Some(0.5), Some(1.0), None, Some(1.5)];
        let histogram = rate_histogram(&values, 2).unwrap();
        assert_eq!(histogram.bins[0].count, 2);
        assert_eq!(histogram.bins[1].count, 2);
        assert_eq!(histogram.missing, 1);
        assert_eq!(histogram.out_of_range, 1);
        assert_eq!(histogram.total(), 4);
    }

    #[test]
    fn test_histogram_requires_bins() {
        assert!(matches!(rate_histogram(&[], 0), Err(AnalysisError::NoBins)));
    }

    #[test]
    fn test_pearson_perfect_and_constant() {
        let xs = [Some(1.0), Some(2.0), Some(3.0), None];
        let ys = [Some(2.0), Some(4.0), Some(6.0), Some(1.0)];
        let (r, n) = pearson(&xs, &ys);
        assert_eq!(n, 3);
        assert!((r.unwrap() - 1.0).abs() < 1e-12);

        let constant = [Some(1.0), Some(1.0), Some(1.0), Some(1.0)];
        assert_eq!(pearson(&constant, &ys).0, None);
    }
}
