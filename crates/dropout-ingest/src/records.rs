//! Typed records extracted from the source tables.
//!
//! Rows without a study id are discarded. Cells that do not parse become
//! `None`; malformed values never fail a fetch. Source order is preserved
//! because several feature rules keep the first record of a study.

use polars::prelude::DataFrame;
use tracing::{debug, warn};

use dropout_common::{bool_values, f64_values, i64_values, text_values};
use dropout_model::StudyId;

use crate::error::{IngestError, Result};
use crate::source::TableSource;
use crate::tables::{
    BASELINE_MEASUREMENTS, BROWSE_CONDITIONS, BROWSE_INTERVENTIONS, CALCULATED_VALUES,
    DROP_WITHDRAWALS, INTERVENTIONS, KEYWORDS, MILESTONES, STUDY_DESIGN, STUDY_ENROLLMENT,
    STUDY_ID_COLUMN, TableSpec,
};

#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalRecord {
    pub study_id: StudyId,
    pub count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentRecord {
    pub study_id: StudyId,
    pub enrollment: Option<i64>,
    pub enrollment_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneRecord {
    pub study_id: StudyId,
    pub title: Option<String>,
    pub count: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementRecord {
    pub study_id: StudyId,
    pub category: Option<String>,
    pub classification: Option<String>,
    pub value: Option<f64>,
}

/// A single categorical term (MeSH term or keyword) attached to a study.
#[derive(Debug, Clone, PartialEq)]
pub struct TermRecord {
    pub study_id: StudyId,
    pub term: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculatedRecord {
    pub study_id: StudyId,
    pub facilities: Option<i64>,
    pub registered_year: Option<i64>,
    pub actual_duration: Option<f64>,
    pub has_us_facility: Option<bool>,
    pub minimum_age: Option<f64>,
    pub maximum_age: Option<f64>,
    pub minimum_age_unit: Option<String>,
    pub maximum_age_unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterventionTypeRecord {
    pub study_id: StudyId,
    pub intervention_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudyRecord {
    pub study_id: StudyId,
    pub study_type: Option<String>,
    pub overall_status: Option<String>,
    pub phase: Option<String>,
    pub arms: Option<i64>,
}

/// A fetched table with its typed column readers bound to the table name.
struct Fetched {
    table: &'static str,
    df: DataFrame,
}

impl Fetched {
    fn fetch<S: TableSource + ?Sized>(source: &S, spec: TableSpec) -> Result<Self> {
        let df = source.fetch(spec.name, spec.columns)?;
        debug!(table = spec.name, rows = df.height(), "fetched table");
        Ok(Self {
            table: spec.name,
            df,
        })
    }

    fn missing_column(&self, column: &str) -> IngestError {
        IngestError::MissingColumn {
            table: self.table.to_string(),
            column: column.to_string(),
        }
    }

    fn text(&self, column: &str) -> Result<Vec<Option<String>>> {
        text_values(&self.df, column).map_err(|_| self.missing_column(column))
    }

    fn float(&self, column: &str) -> Result<Vec<Option<f64>>> {
        f64_values(&self.df, column).map_err(|_| self.missing_column(column))
    }

    fn integer(&self, column: &str) -> Result<Vec<Option<i64>>> {
        i64_values(&self.df, column).map_err(|_| self.missing_column(column))
    }

    fn boolean(&self, column: &str) -> Result<Vec<Option<bool>>> {
        bool_values(&self.df, column).map_err(|_| self.missing_column(column))
    }

    /// Study ids per row; rows without an id are `None` and get skipped.
    fn study_ids(&self) -> Result<Vec<Option<StudyId>>> {
        let ids: Vec<Option<StudyId>> = self
            .text(STUDY_ID_COLUMN)?
            .into_iter()
            .map(|raw| raw.as_deref().and_then(StudyId::parse))
            .collect();
        let missing = ids.iter().filter(|id| id.is_none()).count();
        if missing > 0 {
            warn!(table = self.table, rows = missing, "skipping rows without study id");
        }
        Ok(ids)
    }
}

pub fn fetch_withdrawals<S: TableSource + ?Sized>(source: &S) -> Result<Vec<WithdrawalRecord>> {
    let table = Fetched::fetch(source, DROP_WITHDRAWALS)?;
    let counts = table.integer("count")?;
    Ok(table
        .study_ids()?
        .into_iter()
        .zip(counts)
        .filter_map(|(study_id, count)| Some(WithdrawalRecord { study_id: study_id?, count }))
        .collect())
}

pub fn fetch_enrollments<S: TableSource + ?Sized>(source: &S) -> Result<Vec<EnrollmentRecord>> {
    let table = Fetched::fetch(source, STUDY_ENROLLMENT)?;
    let enrollment = table.integer("enrollment")?;
    let enrollment_type = table.text("enrollment_type")?;
    Ok(table
        .study_ids()?
        .into_iter()
        .zip(enrollment)
        .zip(enrollment_type)
        .filter_map(|((study_id, enrollment), enrollment_type)| {
            Some(EnrollmentRecord {
                study_id: study_id?,
                enrollment,
                enrollment_type,
            })
        })
        .collect())
}

pub fn fetch_milestones<S: TableSource + ?Sized>(source: &S) -> Result<Vec<MilestoneRecord>> {
    let table = Fetched::fetch(source, MILESTONES)?;
    let titles = table.text("title")?;
    let counts = table.integer("count")?;
    Ok(table
        .study_ids()?
        .into_iter()
        .zip(titles)
        .zip(counts)
        .filter_map(|((study_id, title), count)| {
            Some(MilestoneRecord {
                study_id: study_id?,
                title,
                count,
            })
        })
        .collect())
}

pub fn fetch_measurements<S: TableSource + ?Sized>(source: &S) -> Result<Vec<MeasurementRecord>> {
    let table = Fetched::fetch(source, BASELINE_MEASUREMENTS)?;
    let categories = table.text("category")?;
    let classifications = table.text("classification")?;
    let values = table.float("param_value_num")?;
    Ok(table
        .study_ids()?
        .into_iter()
        .zip(categories)
        .zip(classifications)
        .zip(values)
        .filter_map(|(((study_id, category), classification), value)| {
            Some(MeasurementRecord {
                study_id: study_id?,
                category,
                classification,
                value,
            })
        })
        .collect())
}

fn fetch_terms<S: TableSource + ?Sized>(
    source: &S,
    spec: TableSpec,
    term_column: &str,
) -> Result<Vec<TermRecord>> {
    let table = Fetched::fetch(source, spec)?;
    let terms = table.text(term_column)?;
    Ok(table
        .study_ids()?
        .into_iter()
        .zip(terms)
        .filter_map(|(study_id, term)| Some(TermRecord { study_id: study_id?, term }))
        .collect())
}

pub fn fetch_conditions<S: TableSource + ?Sized>(source: &S) -> Result<Vec<TermRecord>> {
    fetch_terms(source, BROWSE_CONDITIONS, "mesh_term")
}

pub fn fetch_interventions<S: TableSource + ?Sized>(source: &S) -> Result<Vec<TermRecord>> {
    fetch_terms(source, BROWSE_INTERVENTIONS, "mesh_term")
}

pub fn fetch_keywords<S: TableSource + ?Sized>(source: &S) -> Result<Vec<TermRecord>> {
    fetch_terms(source, KEYWORDS, "name")
}

pub fn fetch_calculated<S: TableSource + ?Sized>(source: &S) -> Result<Vec<CalculatedRecord>> {
    let table = Fetched::fetch(source, CALCULATED_VALUES)?;
    let facilities = table.integer("number_of_facilities")?;
    let years = table.integer("registered_in_calendar_year")?;
    let durations = table.float("actual_duration")?;
    let us_facility = table.boolean("has_us_facility")?;
    let min_ages = table.float("minimum_age_num")?;
    let max_ages = table.float("maximum_age_num")?;
    let min_units = table.text("minimum_age_unit")?;
    let max_units = table.text("maximum_age_unit")?;

    let mut records = Vec::with_capacity(table.df.height());
    for (idx, study_id) in table.study_ids()?.into_iter().enumerate() {
        let Some(study_id) = study_id else {
            continue;
        };
        records.push(CalculatedRecord {
            study_id,
            facilities: facilities[idx],
            registered_year: years[idx],
            actual_duration: durations[idx],
            has_us_facility: us_facility[idx],
            minimum_age: min_ages[idx],
            maximum_age: max_ages[idx],
            minimum_age_unit: min_units[idx].clone(),
            maximum_age_unit: max_units[idx].clone(),
        });
    }
    Ok(records)
}

pub fn fetch_intervention_types<S: TableSource + ?Sized>(
    source: &S,
) -> Result<Vec<InterventionTypeRecord>> {
    let table = Fetched::fetch(source, INTERVENTIONS)?;
    let types = table.text("intervention_type")?;
    Ok(table
        .study_ids()?
        .into_iter()
        .zip(types)
        .filter_map(|(study_id, intervention_type)| {
            Some(InterventionTypeRecord {
                study_id: study_id?,
                intervention_type,
            })
        })
        .collect())
}

pub fn fetch_studies<S: TableSource + ?Sized>(source: &S) -> Result<Vec<StudyRecord>> {
    let table = Fetched::fetch(source, STUDY_DESIGN)?;
    let study_types = table.text("study_type")?;
    let statuses = table.text("overall_status")?;
    let phases = table.text("phase")?;
    let arms = table.integer("number_of_arms")?;

    let mut records = Vec::with_capacity(table.df.height());
    for (idx, study_id) in table.study_ids()?.into_iter().enumerate() {
        let Some(study_id) = study_id else {
            continue;
        };
        records.push(StudyRecord {
            study_id,
            study_type: study_types[idx].clone(),
            overall_status: statuses[idx].clone(),
            phase: phases[idx].clone(),
            arms: arms[idx],
        });
    }
    Ok(records)
}

/// The three record sets the response extractor reads.
#[derive(Debug, Clone, Default)]
pub struct ResponseInputs {
    pub withdrawals: Vec<WithdrawalRecord>,
    pub enrollments: Vec<EnrollmentRecord>,
    pub milestones: Vec<MilestoneRecord>,
}

impl ResponseInputs {
    /// Fetches every response table; the first failing table ends the fetch.
    pub fn fetch<S: TableSource + ?Sized>(source: &S) -> Result<Self> {
        Ok(Self {
            withdrawals: fetch_withdrawals(source)?,
            enrollments: fetch_enrollments(source)?,
            milestones: fetch_milestones(source)?,
        })
    }
}

/// The six feature record sets plus the studies master table.
#[derive(Debug, Clone, Default)]
pub struct FeatureInputs {
    pub measurements: Vec<MeasurementRecord>,
    pub conditions: Vec<TermRecord>,
    pub interventions: Vec<TermRecord>,
    pub calculated: Vec<CalculatedRecord>,
    pub intervention_types: Vec<InterventionTypeRecord>,
    pub keywords: Vec<TermRecord>,
    pub studies: Vec<StudyRecord>,
}

impl FeatureInputs {
    /// Fetches every feature table; the first failing table ends the fetch.
    pub fn fetch<S: TableSource + ?Sized>(source: &S) -> Result<Self> {
        Ok(Self {
            measurements: fetch_measurements(source)?,
            conditions: fetch_conditions(source)?,
            interventions: fetch_interventions(source)?,
            calculated: fetch_calculated(source)?,
            intervention_types: fetch_intervention_types(source)?,
            keywords: fetch_keywords(source)?,
            studies: fetch_studies(source)?,
        })
    }
}
