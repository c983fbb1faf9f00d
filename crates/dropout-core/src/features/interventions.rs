//! Intervention-type indicators.
//!
//! Only the first intervention record of each study is used. The choice is
//! arbitrary when a study lists several types.

use std::collections::{BTreeMap, BTreeSet};

use dropout_ingest::InterventionTypeRecord;
use dropout_model::{StudyId, TermField, TermFlags, TopKVocabulary};

use crate::text::normalize_term;

/// First-encountered normalized type per study.
pub fn first_intervention_types(
    records: &[InterventionTypeRecord],
) -> BTreeMap<StudyId, Option<String>> {
    let mut first = BTreeMap::new();
    for record in records {
        first.entry(record.study_id.clone()).or_insert_with(|| {
            record
                .intervention_type
                .as_deref()
                .and_then(normalize_term)
        });
    }
    first
}

/// Every distinct first-encountered type, alphabetically.
pub fn intervention_type_vocabulary(
    first: &BTreeMap<StudyId, Option<String>>,
) -> TopKVocabulary {
    let types: BTreeSet<&String> = first.values().flatten().collect();
    TopKVocabulary::new(
        TermField::InterventionType,
        types.into_iter().cloned().collect(),
    )
}

/// One-hot flags per study, restricted to the vocabulary.
pub fn intervention_type_flags(
    first: &BTreeMap<StudyId, Option<String>>,
    vocabulary: &TopKVocabulary,
) -> BTreeMap<StudyId, TermFlags> {
    first
        .iter()
        .map(|(study_id, kind)| {
            let flags = kind
                .iter()
                .filter(|kind| vocabulary.contains(kind))
                .cloned()
                .collect();
            (study_id.clone(), flags)
        })
        .collect()
}
