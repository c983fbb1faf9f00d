//! End-to-end assembly of the modeling table from a table source.

use anyhow::{Context, Result, bail};
use polars::prelude::DataFrame;
use tracing::{info, info_span};

use dropout_ingest::{FeatureInputs, ResponseInputs, TableSource};
use dropout_model::{ModelingTable, PipelineReport, Vocabularies};

use crate::assembly::{DEFAULT_MAX_DROP_RATIO, assemble};
use crate::features::{DEFAULT_TOP_K, FeatureOptions, build_features};
use crate::frame::modeling_frame;
use crate::response::extract_responses;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub top_k: usize,
    /// Rows with `dropped >= enrolled * max_drop_ratio` are removed.
    pub max_drop_ratio: f64,
    pub vocabularies: Option<Vocabularies>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            max_drop_ratio: DEFAULT_MAX_DROP_RATIO,
            vocabularies: None,
        }
    }
}

impl PipelineOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.max_drop_ratio.is_finite() || self.max_drop_ratio <= 0.0 {
            bail!(
                "max drop ratio must be a positive number, got {}",
                self.max_drop_ratio
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub table: ModelingTable,
    pub report: PipelineReport,
}

impl PipelineOutput {
    pub fn to_frame(&self) -> Result<DataFrame> {
        modeling_frame(&self.table).context("build modeling frame")
    }
}

/// Fetches every source table and assembles the modeling table.
pub fn run_pipeline<S: TableSource + ?Sized>(
    source: &S,
    options: &PipelineOptions,
) -> Result<PipelineOutput> {
    options.validate()?;
    let features = FeatureInputs::fetch(source).context("fetch feature tables")?;
    let responses = ResponseInputs::fetch(source).context("fetch response tables")?;
    Ok(build_modeling_table(&features, &responses, options))
}

/// Assembles the modeling table from already extracted record sets.
pub fn build_modeling_table(
    features: &FeatureInputs,
    responses: &ResponseInputs,
    options: &PipelineOptions,
) -> PipelineOutput {
    let _span = info_span!("pipeline", top_k = options.top_k).entered();

    let feature_set = build_features(
        features,
        &FeatureOptions {
            top_k: options.top_k,
            vocabularies: options.vocabularies.clone(),
        },
    );
    let response_set = extract_responses(responses);
    let (table, assembly_report) = assemble(
        feature_set.features,
        &response_set.responses,
        feature_set.vocabularies,
        options.max_drop_ratio,
    );

    let mut report = response_set.report;
    report.extend(feature_set.report);
    report.extend(assembly_report);
    info!(
        rows = table.len(),
        columns = table.schema.len(),
        dropped = report.total_dropped(),
        "modeling table assembled"
    );
    PipelineOutput { table, report }
}
