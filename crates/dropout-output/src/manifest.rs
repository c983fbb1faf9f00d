//! JSON manifest stored next to every table file.
//!
//! The manifest records how the table was built: its column kinds, the
//! vocabularies behind the indicator columns, the gate report of the run,
//! and a hash that ties it to one table file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use dropout_model::{ColumnSpec, PipelineReport, TableSchema, Vocabularies};

use crate::error::{OutputError, Result};

pub const MANIFEST_FORMAT: &str = "dropout-snapshot";
pub const CURRENT_SCHEMA_VERSION: u32 = 1;
const MANIFEST_SUFFIX: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotManifest {
    pub format: String,
    pub schema_version: u32,
    /// RFC 3339 creation time.
    pub created_at: String,
    pub rows: usize,
    pub columns: Vec<ColumnSpec>,
    pub vocabularies: Vocabularies,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<PipelineReport>,
    pub sha256: String,
}

impl SnapshotManifest {
    pub fn new(
        rows: usize,
        schema: &TableSchema,
        vocabularies: &Vocabularies,
        report: Option<&PipelineReport>,
        sha256: String,
    ) -> Self {
        Self {
            format: MANIFEST_FORMAT.to_string(),
            schema_version: CURRENT_SCHEMA_VERSION,
            created_at: Utc::now().to_rfc3339(),
            rows,
            columns: schema.columns.clone(),
            vocabularies: vocabularies.clone(),
            report: report.cloned(),
            sha256,
        }
    }

    pub fn schema(&self) -> TableSchema {
        TableSchema {
            columns: self.columns.clone(),
        }
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }
}

/// `<dir>/<stem>.manifest.json` for a table file `<dir>/<stem>.<ext>`.
pub fn manifest_path(table_path: &Path) -> PathBuf {
    let stem = table_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    table_path.with_file_name(format!("{stem}.{MANIFEST_SUFFIX}"))
}

pub fn write_manifest(path: &Path, manifest: &SnapshotManifest) -> Result<()> {
    let json = serde_json::to_string_pretty(manifest).map_err(|source| OutputError::Manifest {
        operation: "serialize",
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(OutputError::io("write", path))
}

/// Reads a manifest and checks its format tag and version.
pub fn read_manifest(path: &Path) -> Result<SnapshotManifest> {
    let bytes = fs::read(path).map_err(OutputError::io("read", path))?;
    let manifest: SnapshotManifest =
        serde_json::from_slice(&bytes).map_err(|source| OutputError::Manifest {
            operation: "parse",
            path: path.to_path_buf(),
            source,
        })?;
    if manifest.format != MANIFEST_FORMAT {
        return Err(OutputError::InvalidFormat {
            path: path.to_path_buf(),
            reason: format!("unexpected format tag '{}'", manifest.format),
        });
    }
    if manifest.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(OutputError::UnsupportedVersion {
            found: manifest.schema_version,
            max_supported: CURRENT_SCHEMA_VERSION,
            path: path.to_path_buf(),
        });
    }
    Ok(manifest)
}

/// Loads the vocabularies of a previous run.
///
/// `path` may name either a table file or its manifest.
pub fn read_vocabularies(path: &Path) -> Result<Vocabularies> {
    let is_manifest = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(MANIFEST_SUFFIX));
    let manifest = if is_manifest {
        read_manifest(path)?
    } else {
        read_manifest(&manifest_path(path))?
    };
    Ok(manifest.vocabularies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_path_replaces_extension() {
        assert_eq!(
            manifest_path(Path::new("out/training_data.arrow")),
            PathBuf::from("out/training_data.manifest.json")
        );
    }
}
