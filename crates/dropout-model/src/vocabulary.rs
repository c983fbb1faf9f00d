//! Categorical vocabularies that define the indicator columns of a run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Categorical source fields encoded as indicator columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermField {
    Condition,
    Intervention,
    Keyword,
    InterventionType,
}

impl TermField {
    /// Prefix of the indicator column names for this field.
    pub fn column_prefix(self) -> &'static str {
        match self {
            TermField::Condition => "cond",
            TermField::Intervention => "intv",
            TermField::Keyword => "keyword",
            TermField::InterventionType => "intvtype",
        }
    }

    pub fn column_name(self, term: &str) -> String {
        format!("{}_{term}", self.column_prefix())
    }
}

impl fmt::Display for TermField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TermField::Condition => "condition",
            TermField::Intervention => "intervention",
            TermField::Keyword => "keyword",
            TermField::InterventionType => "intervention type",
        };
        f.write_str(label)
    }
}

/// Ordered, normalized terms kept for one categorical field.
///
/// Order is significant: it fixes the column order of the encoded table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopKVocabulary {
    pub field: TermField,
    pub terms: Vec<String>,
}

impl TopKVocabulary {
    pub fn new(field: TermField, terms: Vec<String>) -> Self {
        Self { field, terms }
    }

    pub fn empty(field: TermField) -> Self {
        Self::new(field, Vec::new())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|known| known == term)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Indicator column names in vocabulary order.
    pub fn column_names(&self) -> Vec<String> {
        self.terms
            .iter()
            .map(|term| self.field.column_name(term))
            .collect()
    }
}

/// The full set of vocabularies that fixes a modeling-table schema.
///
/// Persisted next to snapshots so later runs can encode against the same
/// columns instead of refitting on refreshed data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabularies {
    pub conditions: TopKVocabulary,
    pub interventions: TopKVocabulary,
    pub keywords: TopKVocabulary,
    pub intervention_types: TopKVocabulary,
}

impl Default for Vocabularies {
    fn default() -> Self {
        Self {
            conditions: TopKVocabulary::empty(TermField::Condition),
            interventions: TopKVocabulary::empty(TermField::Intervention),
            keywords: TopKVocabulary::empty(TermField::Keyword),
            intervention_types: TopKVocabulary::empty(TermField::InterventionType),
        }
    }
}

impl Vocabularies {
    pub fn get(&self, field: TermField) -> &TopKVocabulary {
        match field {
            TermField::Condition => &self.conditions,
            TermField::Intervention => &self.interventions,
            TermField::Keyword => &self.keywords,
            TermField::InterventionType => &self.intervention_types,
        }
    }
}
