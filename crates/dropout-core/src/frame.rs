//! Conversion of the modeling table to a polars frame.
//!
//! Columns follow [`TableSchema`](dropout_model::TableSchema) order. Values
//! keep their optionality: indicators are plain booleans once assembled,
//! while counts, numerics and `usfacility` stay nullable.

use polars::prelude::{Column, DataFrame, PolarsResult};

use dropout_model::schema::{
    ARMS, DROPPED, DROPRATE, DURATION, ENROLLED, FACILITIES, FEMALE, MALE, MAX_AGE, MIN_AGE,
    STUDY_ID, US_FACILITY, YEAR,
};
use dropout_model::{ModelingRow, ModelingTable, PhaseFlags, TermFlags, TopKVocabulary, phase_column};

fn indicator_columns(
    rows: &[ModelingRow],
    vocabulary: &TopKVocabulary,
    group: impl Fn(&ModelingRow) -> Option<&TermFlags>,
) -> Vec<Column> {
    vocabulary
        .terms
        .iter()
        .map(|term| {
            let values: Vec<bool> = rows
                .iter()
                .map(|row| group(row).is_some_and(|flags| flags.contains(term)))
                .collect();
            Column::new(vocabulary.field.column_name(term).into(), values)
        })
        .collect()
}

/// Builds the modeling frame, one row per study.
pub fn modeling_frame(table: &ModelingTable) -> PolarsResult<DataFrame> {
    let rows = table.rows.as_slice();
    let vocabularies = &table.vocabularies;
    let mut columns = Vec::with_capacity(table.schema.len());

    let ids: Vec<&str> = rows.iter().map(|row| row.study_id.as_str()).collect();
    columns.push(Column::new(STUDY_ID.into(), ids));
    let arms: Vec<Option<i64>> = rows.iter().map(|row| row.features.arms).collect();
    columns.push(Column::new(ARMS.into(), arms));
    for phase in PhaseFlags::PHASES {
        let flags: Vec<bool> = rows
            .iter()
            .map(|row| row.features.phases.get(phase))
            .collect();
        columns.push(Column::new(phase_column(phase).into(), flags));
    }
    let male: Vec<Option<f64>> = rows.iter().map(|row| row.features.male_count).collect();
    columns.push(Column::new(MALE.into(), male));
    let female: Vec<Option<f64>> = rows.iter().map(|row| row.features.female_count).collect();
    columns.push(Column::new(FEMALE.into(), female));

    columns.extend(indicator_columns(rows, &vocabularies.conditions, |row| {
        row.features.conditions.as_ref()
    }));
    columns.extend(indicator_columns(rows, &vocabularies.interventions, |row| {
        row.features.interventions.as_ref()
    }));

    let facilities: Vec<Option<i64>> = rows.iter().map(|row| row.features.facilities).collect();
    columns.push(Column::new(FACILITIES.into(), facilities));
    let year: Vec<Option<i64>> = rows.iter().map(|row| row.features.year).collect();
    columns.push(Column::new(YEAR.into(), year));
    let duration: Vec<Option<f64>> = rows.iter().map(|row| row.features.duration).collect();
    columns.push(Column::new(DURATION.into(), duration));
    let us_facility: Vec<Option<bool>> = rows.iter().map(|row| row.features.us_facility).collect();
    columns.push(Column::new(US_FACILITY.into(), us_facility));
    let min_age: Vec<Option<f64>> = rows.iter().map(|row| row.features.min_age_years).collect();
    columns.push(Column::new(MIN_AGE.into(), min_age));
    let max_age: Vec<Option<f64>> = rows.iter().map(|row| row.features.max_age_years).collect();
    columns.push(Column::new(MAX_AGE.into(), max_age));

    columns.extend(indicator_columns(rows, &vocabularies.intervention_types, |row| {
        row.features.intervention_types.as_ref()
    }));
    columns.extend(indicator_columns(rows, &vocabularies.keywords, |row| {
        row.features.keywords.as_ref()
    }));

    let enrolled: Vec<u64> = rows.iter().map(|row| row.response.enrolled).collect();
    columns.push(Column::new(ENROLLED.into(), enrolled));
    let dropped: Vec<u64> = rows.iter().map(|row| row.response.dropped).collect();
    columns.push(Column::new(DROPPED.into(), dropped));
    let droprate: Vec<Option<f64>> = rows.iter().map(|row| row.response.dropout_rate()).collect();
    columns.push(Column::new(DROPRATE.into(), droprate));

    DataFrame::new(columns)
}
