//! Tables read from a directory of delimited text exports.
//!
//! AACT publishes each relational table as `<table>.txt`, pipe-delimited,
//! with a header row. Cells are read as text; typed conversion happens in
//! the record extractors.

use std::path::{Path, PathBuf};

use polars::prelude::{CsvReadOptions, DataFrame, SerReader};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::source::{TableSource, select_columns};

pub const DEFAULT_EXTENSION: &str = "txt";
pub const DEFAULT_DELIMITER: u8 = b'|';

#[derive(Debug, Clone)]
pub struct FlatFileSource {
    root: PathBuf,
    extension: String,
    delimiter: u8,
}

impl FlatFileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
            delimiter: DEFAULT_DELIMITER,
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `table`.
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(format!("{table}.{}", self.extension))
    }

    fn read_table(&self, table: &str) -> Result<DataFrame> {
        let path = self.table_path(table);
        if !path.is_file() {
            return Err(IngestError::MissingTable {
                table: table.to_string(),
            });
        }
        let delimiter = self.delimiter;
        let df = CsvReadOptions::default()
            .with_has_header(true)
            // Zero-length inference reads every column as text.
            .with_infer_schema_length(Some(0))
            // AACT exports are unquoted; a bare `"` inside free text is data.
            .map_parse_options(|parse| parse.with_separator(delimiter).with_quote_char(None))
            .try_into_reader_with_file_path(Some(path.clone()))
            .map_err(|e| IngestError::Parse {
                table: table.to_string(),
                path: path.clone(),
                message: e.to_string(),
            })?
            .finish()
            .map_err(|e| IngestError::Parse {
                table: table.to_string(),
                path: path.clone(),
                message: e.to_string(),
            })?;
        debug!(
            table,
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "read flat file"
        );
        Ok(df)
    }
}

impl TableSource for FlatFileSource {
    fn fetch(&self, table: &str, columns: &[&str]) -> Result<DataFrame> {
        let df = self.read_table(table)?;
        select_columns(table, &df, columns)
    }
}
