//! Per-study feature values.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::vocabulary::TopKVocabulary;

/// Normalized terms present for one study within one categorical field.
///
/// Only terms that belong to the field's vocabulary are kept; anything
/// outside the top-K is dropped before it reaches this set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFlags {
    present: BTreeSet<String>,
}

impl TermFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, term: impl Into<String>) {
        self.present.insert(term.into());
    }

    /// Whether the flag for `term` is set.
    pub fn contains(&self, term: &str) -> bool {
        self.present.contains(term)
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.present.iter().map(String::as_str)
    }

    /// One boolean per vocabulary term, in vocabulary order.
    pub fn flags<'a>(&self, vocabulary: &'a TopKVocabulary) -> Vec<(&'a str, bool)> {
        vocabulary
            .terms
            .iter()
            .map(|term| (term.as_str(), self.contains(term)))
            .collect()
    }
}

impl<S: Into<String>> FromIterator<S> for TermFlags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            present: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Trial phase indicators. Several may be set at once ("Phase 1/Phase 2").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseFlags {
    flags: [bool; 4],
}

impl PhaseFlags {
    pub const PHASES: [u8; 4] = [1, 2, 3, 4];

    pub fn set(&mut self, phase: u8) {
        if let Some(slot) = Self::slot(phase) {
            self.flags[slot] = true;
        }
    }

    /// Whether `phase` (1-4) is flagged. Out-of-range phases are never set.
    pub fn get(&self, phase: u8) -> bool {
        Self::slot(phase).is_some_and(|slot| self.flags[slot])
    }

    pub fn any(&self) -> bool {
        self.flags.iter().any(|flag| *flag)
    }

    fn slot(phase: u8) -> Option<usize> {
        match phase {
            1..=4 => Some(usize::from(phase) - 1),
            _ => None,
        }
    }
}

/// Age units recognized in eligibility limits, with their size in years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
}

impl AgeUnit {
    /// Parses a unit label such as `"Years"` or `" week "`.
    ///
    /// The label is lowercased and trimmed, and one plural `s` is removed.
    pub fn from_label(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_lowercase();
        let singular = lowered.strip_suffix('s').unwrap_or(&lowered).trim();
        match singular {
            "year" => Some(AgeUnit::Year),
            "month" => Some(AgeUnit::Month),
            "week" => Some(AgeUnit::Week),
            "day" => Some(AgeUnit::Day),
            "hour" => Some(AgeUnit::Hour),
            "minute" => Some(AgeUnit::Minute),
            _ => None,
        }
    }

    /// Conversion factor from this unit to years.
    pub fn years_per_unit(self) -> f64 {
        match self {
            AgeUnit::Year => 1.0,
            AgeUnit::Month => 1.0 / 12.0,
            AgeUnit::Week => 1.0 / 52.1429,
            AgeUnit::Day => 1.0 / 365.2422,
            AgeUnit::Hour => 1.0 / 8760.0,
            AgeUnit::Minute => 1.0 / 525_600.0,
        }
    }
}

/// Engineered features for one completed, interventional study.
///
/// `None` marks a value the sources did not provide. Categorical groups are
/// `None` when the study had no rows in that source at all; the assembly
/// step turns those into all-false indicators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyFeatures {
    pub arms: Option<i64>,
    pub phases: PhaseFlags,
    pub male_count: Option<f64>,
    pub female_count: Option<f64>,
    pub conditions: Option<TermFlags>,
    pub interventions: Option<TermFlags>,
    pub facilities: Option<i64>,
    pub year: Option<i64>,
    /// Actual study duration in months.
    pub duration: Option<f64>,
    pub us_facility: Option<bool>,
    pub min_age_years: Option<f64>,
    pub max_age_years: Option<f64>,
    pub intervention_types: Option<TermFlags>,
    pub keywords: Option<TermFlags>,
}

impl StudyFeatures {
    /// Replaces every missing categorical group with an empty (all-false) one.
    pub fn fill_missing_indicators(&mut self) {
        for group in [
            &mut self.conditions,
            &mut self.interventions,
            &mut self.intervention_types,
            &mut self.keywords,
        ] {
            group.get_or_insert_with(TermFlags::new);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_flags_ignore_out_of_range() {
        let mut phases = PhaseFlags::default();
        phases.set(2);
        phases.set(7);
        assert!(phases.get(2));
        assert!(!phases.get(7));
        assert!(!phases.get(0));
        assert!(phases.any());
    }

    #[test]
    fn test_age_unit_labels() {
        assert_eq!(AgeUnit::from_label("Years"), Some(AgeUnit::Year));
        assert_eq!(AgeUnit::from_label(" weeks "), Some(AgeUnit::Week));
        assert_eq!(AgeUnit::from_label("Minute"), Some(AgeUnit::Minute));
        assert_eq!(AgeUnit::from_label("N/A"), None);
        assert_eq!(AgeUnit::from_label(""), None);
    }

    #[test]
    fn test_fill_missing_indicators_keeps_existing_flags() {
        let mut features = StudyFeatures {
            conditions: Some(["diabetesmellitus"].into_iter().collect()),
            ..StudyFeatures::default()
        };
        features.fill_missing_indicators();
        assert!(
            features
                .conditions
                .as_ref()
                .is_some_and(|flags| flags.contains("diabetesmellitus"))
        );
        assert_eq!(features.keywords, Some(TermFlags::new()));
        assert_eq!(features.male_count, None);
    }
}
