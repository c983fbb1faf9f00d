//! Shared utilities for the dropout analysis crates.
//!
//! This crate provides Polars cell conversion and typed column readers used
//! by ingestion, the feature pipeline, and the analysis consumers.

pub mod values;

pub use values::{
    any_to_bool, any_to_f64, any_to_i64, any_to_string, any_to_text, bool_values, f64_values,
    format_numeric, i64_values, parse_bool, parse_f64, parse_i64, text_values,
};
