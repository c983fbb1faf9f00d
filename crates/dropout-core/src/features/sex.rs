//! Male and female participant counts from baseline demographics.

use std::collections::BTreeMap;

use dropout_ingest::MeasurementRecord;
use dropout_model::StudyId;

use crate::text::starts_with_ignore_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    fn prefix(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }

    /// Whether the record's category or classification names this sex.
    pub fn matches(self, record: &MeasurementRecord) -> bool {
        [&record.category, &record.classification]
            .into_iter()
            .flatten()
            .any(|text| starts_with_ignore_case(text, self.prefix()))
    }
}

/// Summed counts per sex. Both are `None` when the study had no evidence.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SexCounts {
    pub male: Option<f64>,
    pub female: Option<f64>,
}

/// Aggregates matching measurement values per study.
///
/// A study with at least one matching, counted record gets both sums, the
/// absent sex summing to 0. A study whose records never match (or carry no
/// value) gets both counts missing.
pub fn sex_counts(records: &[MeasurementRecord]) -> BTreeMap<StudyId, SexCounts> {
    let mut sums: BTreeMap<StudyId, (f64, f64, bool)> = BTreeMap::new();
    for record in records {
        let entry = sums
            .entry(record.study_id.clone())
            .or_insert((0.0, 0.0, false));
        let Some(value) = record.value else {
            continue;
        };
        if Sex::Male.matches(record) {
            entry.0 += value;
            entry.2 = true;
        }
        if Sex::Female.matches(record) {
            entry.1 += value;
            entry.2 = true;
        }
    }
    sums.into_iter()
        .map(|(study_id, (male, female, evidence))| {
            let counts = if evidence {
                SexCounts {
                    male: Some(male),
                    female: Some(female),
                }
            } else {
                SexCounts::default()
            };
            (study_id, counts)
        })
        .collect()
}
