//! Feature engineering over the completed, interventional studies.
//!
//! Every feature source is left-joined onto the filtered study list, so a
//! study absent from a source keeps `None` for that source's values.

pub mod age;
pub mod design;
pub mod interventions;
pub mod sex;
pub mod vocabulary;

use std::collections::BTreeMap;

use tracing::{debug, info, info_span};

use dropout_ingest::{CalculatedRecord, FeatureInputs};
use dropout_model::{
    Gate, GateReport, PipelineReport, StudyFeatures, StudyId, TermField, Vocabularies,
};

use crate::audit::log_gate;

pub use age::age_in_years;
pub use design::{parse_phase_flags, study_filter};
pub use interventions::{
    first_intervention_types, intervention_type_flags, intervention_type_vocabulary,
};
pub use sex::{Sex, SexCounts, sex_counts};
pub use vocabulary::{encode, fit_terms, fit_vocabulary, term_flags};

pub const DEFAULT_TOP_K: usize = 5;

#[derive(Debug, Clone)]
pub struct FeatureOptions {
    /// Terms kept per categorical field when fitting.
    pub top_k: usize,
    /// Previously fitted vocabularies; reused instead of refitting.
    pub vocabularies: Option<Vocabularies>,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            vocabularies: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    pub features: BTreeMap<StudyId, StudyFeatures>,
    pub vocabularies: Vocabularies,
    pub report: PipelineReport,
}

/// Fits all four vocabularies over the full extracted record sets.
pub fn fit_vocabularies(inputs: &FeatureInputs, top_k: usize) -> Vocabularies {
    let first_types = first_intervention_types(&inputs.intervention_types);
    Vocabularies {
        conditions: fit_terms(TermField::Condition, &inputs.conditions, top_k),
        interventions: fit_terms(TermField::Intervention, &inputs.interventions, top_k),
        keywords: fit_terms(TermField::Keyword, &inputs.keywords, top_k),
        intervention_types: intervention_type_vocabulary(&first_types),
    }
}

fn first_calculated(records: &[CalculatedRecord]) -> BTreeMap<&StudyId, &CalculatedRecord> {
    let mut first = BTreeMap::new();
    for record in records {
        first.entry(&record.study_id).or_insert(record);
    }
    first
}

/// Builds one feature record per completed, interventional study.
pub fn build_features(inputs: &FeatureInputs, options: &FeatureOptions) -> FeatureSet {
    let _span = info_span!("build_features").entered();

    let vocabularies = match &options.vocabularies {
        Some(prior) => {
            info!("reusing prior vocabularies");
            prior.clone()
        }
        None => fit_vocabularies(inputs, options.top_k),
    };

    let mut filter = GateReport::new(Gate::StudyFilter);
    let mut features: BTreeMap<StudyId, StudyFeatures> = BTreeMap::new();
    for study in &inputs.studies {
        if features.contains_key(&study.study_id) {
            debug!(study = %study.study_id, "ignoring duplicate study row");
            continue;
        }
        match study_filter(study) {
            Ok(()) => {
                filter.keep();
                features.insert(
                    study.study_id.clone(),
                    StudyFeatures {
                        arms: study.arms,
                        phases: parse_phase_flags(study.phase.as_deref()),
                        ..StudyFeatures::default()
                    },
                );
            }
            Err(reason) => filter.drop_row(reason),
        }
    }
    log_gate(&filter);

    let sexes = sex_counts(&inputs.measurements);
    let mut conditions = term_flags(&inputs.conditions, &vocabularies.conditions);
    let mut interventions = term_flags(&inputs.interventions, &vocabularies.interventions);
    let mut keywords = term_flags(&inputs.keywords, &vocabularies.keywords);
    let mut types = intervention_type_flags(
        &first_intervention_types(&inputs.intervention_types),
        &vocabularies.intervention_types,
    );
    let calculated = first_calculated(&inputs.calculated);

    for (study_id, study) in &mut features {
        if let Some(counts) = sexes.get(study_id) {
            study.male_count = counts.male;
            study.female_count = counts.female;
        }
        study.conditions = conditions.remove(study_id);
        study.interventions = interventions.remove(study_id);
        study.keywords = keywords.remove(study_id);
        study.intervention_types = types.remove(study_id);
        if let Some(values) = calculated.get(study_id) {
            study.facilities = values.facilities;
            study.year = values.registered_year;
            study.duration = values.actual_duration;
            study.us_facility = values.has_us_facility;
            study.min_age_years =
                age_in_years(values.minimum_age, values.minimum_age_unit.as_deref());
            study.max_age_years =
                age_in_years(values.maximum_age, values.maximum_age_unit.as_deref());
        }
    }

    let mut report = PipelineReport::default();
    report.push(filter);
    FeatureSet {
        features,
        vocabularies,
        report,
    }
}
