//! The tabular fetch capability and its in-memory implementation.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;

use crate::error::{IngestError, Result};

/// A read-only relational source: table name plus columns in, rows out.
///
/// Implementations return exactly the requested columns, in request order.
/// A missing table or column is an error that names it.
pub trait TableSource {
    fn fetch(&self, table: &str, columns: &[&str]) -> Result<DataFrame>;
}

impl<T: TableSource + ?Sized> TableSource for &T {
    fn fetch(&self, table: &str, columns: &[&str]) -> Result<DataFrame> {
        (**self).fetch(table, columns)
    }
}

/// Projects `df` onto `columns`, reporting the first missing column.
pub fn select_columns(table: &str, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
    let available: Vec<&str> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect();
    if let Some(missing) = columns.iter().find(|column| !available.contains(column)) {
        return Err(IngestError::MissingColumn {
            table: table.to_string(),
            column: (*missing).to_string(),
        });
    }
    df.select(columns.iter().copied())
        .map_err(|e| IngestError::fetch(table, e))
}

/// Tables held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: BTreeMap<String, DataFrame>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a table.
    pub fn insert(&mut self, table: impl Into<String>, df: DataFrame) {
        self.tables.insert(table.into(), df);
    }

    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>, df: DataFrame) -> Self {
        self.insert(table, df);
        self
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

impl TableSource for MemorySource {
    fn fetch(&self, table: &str, columns: &[&str]) -> Result<DataFrame> {
        let df = self
            .tables
            .get(table)
            .ok_or_else(|| IngestError::MissingTable {
                table: table.to_string(),
            })?;
        select_columns(table, df, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::Column;

    fn milestones() -> DataFrame {
        DataFrame::new(vec![
            Column::new("nct_id".into(), ["NCT1", "NCT1"]),
            Column::new("title".into(), ["STARTED", "COMPLETED"]),
            Column::new("count".into(), [10i64, 8]),
            Column::new("period".into(), ["Overall", "Overall"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_fetch_projects_requested_columns() {
        let source = MemorySource::new().with_table("milestones", milestones());
        let df = source.fetch("milestones", &["count", "nct_id"]).unwrap();
        let names: Vec<&str> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();
        assert_eq!(names, vec!["count", "nct_id"]);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_fetch_missing_table() {
        let source = MemorySource::new();
        let err = source.fetch("keywords", &["nct_id"]).unwrap_err();
        assert!(matches!(err, IngestError::MissingTable { ref table } if table == "keywords"));
    }

    #[test]
    fn test_fetch_missing_column() {
        let source = MemorySource::new().with_table("milestones", milestones());
        let err = source
            .fetch("milestones", &["nct_id", "milestone_title"])
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn { ref column, .. } if column == "milestone_title"
        ));
    }
}
