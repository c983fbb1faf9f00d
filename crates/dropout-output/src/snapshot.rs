//! Arrow IPC snapshots of the modeling table.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::{DataFrame, IpcReader, IpcWriter, SerReader, SerWriter};
use tracing::{info, warn};

use dropout_model::{PipelineReport, TableSchema, Vocabularies};

use crate::error::{OutputError, Result};
use crate::hash::file_sha256;
use crate::manifest::{SnapshotManifest, manifest_path, read_manifest, write_manifest};

pub const SNAPSHOT_EXTENSION: &str = "arrow";

/// A loaded table with the manifest it was verified against.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub frame: DataFrame,
    pub manifest: SnapshotManifest,
}

/// What a snapshot write needs besides the frame.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotContext<'a> {
    pub schema: &'a TableSchema,
    pub vocabularies: &'a Vocabularies,
    pub report: Option<&'a PipelineReport>,
}

fn frame_columns(frame: &DataFrame) -> Vec<&str> {
    frame
        .get_column_names()
        .into_iter()
        .map(|name| name.as_str())
        .collect()
}

fn write_ipc(path: &Path, frame: &mut DataFrame) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(OutputError::io("create directory", parent))?;
    }
    let temp_path = path.with_extension(format!("{SNAPSHOT_EXTENSION}.tmp"));
    let mut file = File::create(&temp_path).map_err(OutputError::io("create", &temp_path))?;
    IpcWriter::new(&mut file)
        .finish(frame)
        .map_err(|source| OutputError::Table {
            operation: "write",
            path: temp_path.clone(),
            source,
        })?;
    file.sync_all().map_err(OutputError::io("sync", &temp_path))?;
    fs::rename(&temp_path, path).map_err(OutputError::io("rename", path))
}

/// Writes `frame` and its manifest. The frame columns must match the schema.
pub fn write_snapshot(
    path: &Path,
    frame: &DataFrame,
    context: SnapshotContext<'_>,
) -> Result<SnapshotManifest> {
    let expected = context.schema.names();
    let found = frame_columns(frame);
    if expected != found {
        return Err(OutputError::SchemaMismatch {
            path: path.to_path_buf(),
            reason: format!("frame columns {found:?} differ from schema {expected:?}"),
        });
    }

    let mut frame = frame.clone();
    write_ipc(path, &mut frame)?;
    let manifest = SnapshotManifest::new(
        frame.height(),
        context.schema,
        context.vocabularies,
        context.report,
        file_sha256(path)?,
    );
    let manifest_file = manifest_path(path);
    write_manifest(&manifest_file, &manifest)?;
    info!(
        path = %path.display(),
        manifest = %manifest_file.display(),
        rows = manifest.rows,
        columns = manifest.columns.len(),
        "wrote snapshot"
    );
    Ok(manifest)
}

/// Loads a snapshot, verifying hash, row count and columns against its
/// manifest.
pub fn read_snapshot(path: &Path) -> Result<Snapshot> {
    let manifest = read_manifest(&manifest_path(path))?;
    let actual = file_sha256(path)?;
    if actual != manifest.sha256 {
        warn!(path = %path.display(), "snapshot hash mismatch");
        return Err(OutputError::HashMismatch {
            path: path.to_path_buf(),
            expected: manifest.sha256,
            actual,
        });
    }

    let file = File::open(path).map_err(OutputError::io("open", path))?;
    let frame = IpcReader::new(file)
        .finish()
        .map_err(|source| OutputError::Table {
            operation: "read",
            path: path.to_path_buf(),
            source,
        })?;

    if frame_columns(&frame) != manifest.column_names() {
        return Err(OutputError::SchemaMismatch {
            path: path.to_path_buf(),
            reason: "columns differ from manifest".to_string(),
        });
    }
    if frame.height() != manifest.rows {
        return Err(OutputError::SchemaMismatch {
            path: path.to_path_buf(),
            reason: format!(
                "{} rows on disk, {} in manifest",
                frame.height(),
                manifest.rows
            ),
        });
    }
    info!(path = %path.display(), rows = frame.height(), "loaded snapshot");
    Ok(Snapshot { frame, manifest })
}

/// `<dir>/<stem>.arrow`
pub fn snapshot_path(dir: &Path, stem: &str) -> PathBuf {
    dir.join(format!("{stem}.{SNAPSHOT_EXTENSION}"))
}
