//! Random holdout split into training and testing partitions.

use std::path::{Path, PathBuf};

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::info;

use crate::error::{OutputError, Result};
use crate::manifest::SnapshotManifest;
use crate::snapshot::{SnapshotContext, snapshot_path, write_snapshot};

pub const DEFAULT_TEST_FRACTION: f64 = 0.25;
pub const TRAINING_PREFIX: &str = "training";
pub const TESTING_PREFIX: &str = "testing";

/// Both partitions keep the input's columns and relative row order.
#[derive(Debug, Clone)]
pub struct HoldoutSplit {
    pub training: DataFrame,
    pub testing: DataFrame,
}

/// Number of test rows for `rows` rows: `ceil(rows * fraction)`.
pub fn test_size(rows: usize, fraction: f64) -> Result<usize> {
    if !(fraction > 0.0 && fraction < 1.0) {
        return Err(OutputError::InvalidFraction { fraction });
    }
    let size = (rows as f64 * fraction).ceil() as usize;
    Ok(size.min(rows))
}

/// Splits `frame` at random. The same seed always selects the same rows.
pub fn holdout_split(
    frame: &DataFrame,
    test_fraction: f64,
    seed: Option<u64>,
) -> Result<HoldoutSplit> {
    let rows = frame.height();
    let size = test_size(rows, test_fraction)?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut indices: Vec<usize> = (0..rows).collect();
    indices.shuffle(&mut rng);

    let mut in_test = vec![false; rows];
    for &idx in indices.iter().take(size) {
        in_test[idx] = true;
    }
    let in_training: Vec<bool> = in_test.iter().map(|test| !test).collect();

    let test_mask = BooleanChunked::from_slice("testing".into(), &in_test);
    let training_mask = BooleanChunked::from_slice("training".into(), &in_training);
    let testing = frame
        .filter(&test_mask)
        .map_err(|source| OutputError::Split { source })?;
    let training = frame
        .filter(&training_mask)
        .map_err(|source| OutputError::Split { source })?;
    info!(
        training = training.height(),
        testing = testing.height(),
        seeded = seed.is_some(),
        "holdout split"
    );
    Ok(HoldoutSplit { training, testing })
}

#[derive(Debug, Clone)]
pub struct PartitionFiles {
    pub training: PathBuf,
    pub testing: PathBuf,
    pub training_manifest: SnapshotManifest,
    pub testing_manifest: SnapshotManifest,
}

/// Writes `training_<suffix>.arrow` and `testing_<suffix>.arrow` to `dir`.
pub fn write_partitions(
    dir: &Path,
    suffix: &str,
    split: &HoldoutSplit,
    context: SnapshotContext<'_>,
) -> Result<PartitionFiles> {
    let training = snapshot_path(dir, &format!("{TRAINING_PREFIX}_{suffix}"));
    let testing = snapshot_path(dir, &format!("{TESTING_PREFIX}_{suffix}"));
    let training_manifest = write_snapshot(&training, &split.training, context)?;
    let testing_manifest = write_snapshot(&testing, &split.testing, context)?;
    Ok(PartitionFiles {
        training,
        testing,
        training_manifest,
        testing_manifest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_rounds_up() {
        assert_eq!(test_size(10, 0.25).unwrap(), 3);
        assert_eq!(test_size(8, 0.25).unwrap(), 2);
        assert_eq!(test_size(1, 0.25).unwrap(), 1);
        assert_eq!(test_size(0, 0.25).unwrap(), 0);
    }

    #[test]
    fn test_fraction_bounds() {
        for fraction in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                test_size(10, fraction),
                Err(OutputError::InvalidFraction { .. })
            ));
        }
    }
}
