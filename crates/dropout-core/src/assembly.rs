//! Joining features with responses and the drop-ratio post-filter.

use std::collections::{BTreeMap, BTreeSet};

use tracing::info_span;

use dropout_model::{
    DropReason, Gate, GateReport, ModelingRow, ModelingTable, PipelineReport, StudyFeatures,
    StudyId, StudyResponse, Vocabularies,
};

use crate::audit::log_gate;

pub const DEFAULT_MAX_DROP_RATIO: f64 = 1.0;

/// Whether a study's dropout ratio is strictly below `threshold`.
///
/// Studies with no enrollment never pass.
pub fn below_drop_ratio(response: StudyResponse, threshold: f64) -> bool {
    (response.dropped as f64) < (response.enrolled as f64) * threshold
}

/// Inner-joins features with responses, filters by dropout ratio and fills
/// missing indicator groups.
pub fn assemble(
    mut features: BTreeMap<StudyId, StudyFeatures>,
    responses: &BTreeMap<StudyId, StudyResponse>,
    vocabularies: Vocabularies,
    max_drop_ratio: f64,
) -> (ModelingTable, PipelineReport) {
    let _span = info_span!("assemble", max_drop_ratio).entered();

    let ids: BTreeSet<StudyId> = features.keys().chain(responses.keys()).cloned().collect();
    let mut join = GateReport::new(Gate::ModelJoin);
    let mut joined = Vec::new();
    for study_id in ids {
        match (features.remove(&study_id), responses.get(&study_id)) {
            (Some(study), Some(&response)) => {
                join.keep();
                joined.push(ModelingRow {
                    study_id,
                    features: study,
                    response,
                });
            }
            (Some(_), None) => join.drop_row(DropReason::MissingResponse),
            (None, _) => join.drop_row(DropReason::MissingFeatures),
        }
    }
    log_gate(&join);

    let mut ratio = GateReport::new(Gate::DropRatio);
    let mut rows = Vec::with_capacity(joined.len());
    for mut row in joined {
        if below_drop_ratio(row.response, max_drop_ratio) {
            ratio.keep();
            row.features.fill_missing_indicators();
            rows.push(row);
        } else {
            ratio.drop_row(DropReason::DropRatioAtThreshold);
        }
    }
    log_gate(&ratio);

    let mut report = PipelineReport::default();
    report.push(join);
    report.push(ratio);
    (ModelingTable::new(vocabularies, rows), report)
}
