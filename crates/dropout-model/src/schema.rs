//! Typed column layout of the modeling table.
//!
//! Every column carries a [`ColumnKind`] from the moment it is created.
//! Consumers select predictors and apply the missing-indicator default by
//! kind, never by inspecting column names.

use serde::{Deserialize, Serialize};

use crate::features::PhaseFlags;
use crate::vocabulary::Vocabularies;

pub const STUDY_ID: &str = "nct_id";
pub const ARMS: &str = "arms";
pub const MALE: &str = "male";
pub const FEMALE: &str = "female";
pub const FACILITIES: &str = "facilities";
pub const YEAR: &str = "year";
pub const DURATION: &str = "duration";
pub const US_FACILITY: &str = "usfacility";
pub const MIN_AGE: &str = "minage";
pub const MAX_AGE: &str = "maxage";
pub const ENROLLED: &str = "enrolled";
pub const DROPPED: &str = "dropped";
pub const DROPRATE: &str = "droprate";

/// Name of the indicator column for a trial phase (1-4).
pub fn phase_column(phase: u8) -> String {
    format!("phase{phase}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Study identifier (join key).
    Identifier,
    /// Response columns (`enrolled`, `dropped`, `droprate`).
    Response,
    /// Participant counts that may be missing.
    Count,
    /// Whole-number attributes that may be missing.
    Integer,
    /// Continuous attributes that may be missing.
    Numeric,
    /// Optional yes/no attribute; missing stays missing.
    Boolean,
    /// Indicator flag; missing means "not present" and defaults to `false`.
    Indicator,
}

impl ColumnKind {
    /// Whether the column may enter a model as an explanatory variable.
    pub fn is_predictor(self) -> bool {
        matches!(
            self,
            ColumnKind::Count
                | ColumnKind::Integer
                | ColumnKind::Numeric
                | ColumnKind::Boolean
                | ColumnKind::Indicator
        )
    }

    pub fn defaults_to_false(self) -> bool {
        matches!(self, ColumnKind::Indicator)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered column specs of a modeling table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Builds the modeling-table layout implied by a set of vocabularies.
    pub fn for_vocabularies(vocabularies: &Vocabularies) -> Self {
        let mut columns = vec![
            ColumnSpec::new(STUDY_ID, ColumnKind::Identifier),
            ColumnSpec::new(ARMS, ColumnKind::Integer),
        ];
        for phase in PhaseFlags::PHASES {
            columns.push(ColumnSpec::new(phase_column(phase), ColumnKind::Indicator));
        }
        columns.push(ColumnSpec::new(MALE, ColumnKind::Count));
        columns.push(ColumnSpec::new(FEMALE, ColumnKind::Count));
        push_indicators(&mut columns, vocabularies.conditions.column_names());
        push_indicators(&mut columns, vocabularies.interventions.column_names());
        columns.extend([
            ColumnSpec::new(FACILITIES, ColumnKind::Integer),
            ColumnSpec::new(YEAR, ColumnKind::Integer),
            ColumnSpec::new(DURATION, ColumnKind::Numeric),
            ColumnSpec::new(US_FACILITY, ColumnKind::Boolean),
            ColumnSpec::new(MIN_AGE, ColumnKind::Numeric),
            ColumnSpec::new(MAX_AGE, ColumnKind::Numeric),
        ]);
        push_indicators(&mut columns, vocabularies.intervention_types.column_names());
        push_indicators(&mut columns, vocabularies.keywords.column_names());
        columns.extend([
            ColumnSpec::new(ENROLLED, ColumnKind::Response),
            ColumnSpec::new(DROPPED, ColumnKind::Response),
            ColumnSpec::new(DROPRATE, ColumnKind::Response),
        ]);
        Self { columns }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.get(name).map(|column| column.kind)
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn indicator_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns
            .iter()
            .filter(|column| column.kind.defaults_to_false())
    }

    pub fn predictor_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.columns.iter().filter(|column| column.kind.is_predictor())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn push_indicators(columns: &mut Vec<ColumnSpec>, names: Vec<String>) {
    columns.extend(
        names
            .into_iter()
            .map(|name| ColumnSpec::new(name, ColumnKind::Indicator)),
    );
}
