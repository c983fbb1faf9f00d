//! Dropout modeling-table pipeline.
//!
//! Three stages run over typed source records:
//!
//! 1. [`response`] derives enrolled and dropped counts and keeps only
//!    studies whose withdrawal, enrollment and milestone counts agree.
//! 2. [`features`] engineers per-study predictors for completed,
//!    interventional studies.
//! 3. [`assembly`] joins the two, applies the drop-ratio filter and fills
//!    missing indicator groups.
//!
//! [`pipeline::run_pipeline`] runs all three against a
//! [`TableSource`](dropout_ingest::TableSource) and returns the table with a
//! report of every row removed along the way.

pub mod assembly;
pub mod audit;
pub mod features;
pub mod frame;
pub mod pipeline;
pub mod response;
pub mod text;

pub use assembly::{DEFAULT_MAX_DROP_RATIO, assemble, below_drop_ratio};
pub use features::{DEFAULT_TOP_K, FeatureOptions, FeatureSet, build_features, fit_vocabularies};
pub use frame::modeling_frame;
pub use pipeline::{PipelineOptions, PipelineOutput, build_modeling_table, run_pipeline};
pub use response::{ResponseSet, extract_responses};
