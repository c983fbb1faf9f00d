//! Source-table ingestion for the dropout pipeline.
//!
//! The pipeline reads its inputs through [`TableSource`], a read-only
//! "table name + columns in, rows out" capability. Two implementations ship
//! here: [`FlatFileSource`] for AACT flat-file exports and [`MemorySource`]
//! for frames built in memory. Typed extractors turn fetched frames into
//! the record sets consumed by the response and feature stages.

pub mod error;
pub mod flat_file;
pub mod records;
pub mod source;
pub mod tables;

pub use error::{IngestError, Result};
pub use flat_file::{DEFAULT_DELIMITER, DEFAULT_EXTENSION, FlatFileSource};
pub use records::{
    CalculatedRecord, EnrollmentRecord, FeatureInputs, InterventionTypeRecord, MeasurementRecord,
    MilestoneRecord, ResponseInputs, StudyRecord, TermRecord, WithdrawalRecord,
    fetch_calculated, fetch_conditions, fetch_enrollments, fetch_intervention_types,
    fetch_interventions, fetch_keywords, fetch_measurements, fetch_milestones, fetch_studies,
    fetch_withdrawals,
};
pub use source::{MemorySource, TableSource, select_columns};
pub use tables::TableSpec;
