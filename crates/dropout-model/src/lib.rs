//! Domain model for clinical-trial dropout analysis.
//!
//! Types shared by ingestion, the feature pipeline and the output crates:
//! study identifiers, responses, engineered features, vocabularies, the
//! typed modeling-table schema, and gate reports.

pub mod features;
pub mod gate;
pub mod ids;
pub mod response;
pub mod row;
pub mod schema;
pub mod vocabulary;

pub use features::{AgeUnit, PhaseFlags, StudyFeatures, TermFlags};
pub use gate::{DropReason, Gate, GateReport, PipelineReport};
pub use ids::StudyId;
pub use response::{MilestoneKind, StudyResponse};
pub use row::{ModelingRow, ModelingTable};
pub use schema::{ColumnKind, ColumnSpec, TableSchema, phase_column};
pub use vocabulary::{TermField, TopKVocabulary, Vocabularies};
