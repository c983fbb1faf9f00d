//! Persistence of modeling tables.
//!
//! Tables are written as Arrow IPC files with a JSON manifest beside them
//! (`<stem>.manifest.json`). Loading checks the manifest's format, version
//! and hash before trusting the file. The holdout split produces training
//! and testing partitions stored the same way.

pub mod error;
pub mod hash;
pub mod manifest;
pub mod snapshot;
pub mod split;

pub use error::{OutputError, Result};
pub use hash::file_sha256;
pub use manifest::{
    CURRENT_SCHEMA_VERSION, MANIFEST_FORMAT, SnapshotManifest, manifest_path, read_manifest,
    read_vocabularies,
};
pub use snapshot::{
    SNAPSHOT_EXTENSION, Snapshot, SnapshotContext, read_snapshot, snapshot_path, write_snapshot,
};
pub use split::{
    DEFAULT_TEST_FRACTION, HoldoutSplit, PartitionFiles, TESTING_PREFIX, TRAINING_PREFIX,
    holdout_split, test_size, write_partitions,
};
