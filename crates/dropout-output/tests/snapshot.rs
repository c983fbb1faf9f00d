use std::fs;

use dropout_model::{
    ColumnKind, ColumnSpec, PipelineReport, TableSchema, TermField, TopKVocabulary, Vocabularies,
};
use dropout_output::{
    OutputError, SnapshotContext, holdout_split, manifest_path, read_snapshot, read_vocabularies,
    write_partitions, write_snapshot,
};
use polars::prelude::{Column, DataFrame};
use tempfile::tempdir;

fn schema() -> TableSchema {
    TableSchema {
        columns: vec![
            ColumnSpec::new("nct_id", ColumnKind::Identifier),
            ColumnSpec::new("arms", ColumnKind::Integer),
            ColumnSpec::new("cond_asthma", ColumnKind::Indicator),
            ColumnSpec::new("droprate", ColumnKind::Response),
        ],
    }
}

fn vocabularies() -> Vocabularies {
    Vocabularies {
        conditions: TopKVocabulary::new(TermField::Condition, vec!["asthma".to_string()]),
        ..Vocabularies::default()
    }
}

fn frame(rows: usize) -> DataFrame {
    let ids: Vec<String> = (0..rows).map(|idx| format!("NCT{idx:08}")).collect();
    let arms: Vec<Option<i64>> = (0..rows).map(|idx| (idx % 3 != 0).then_some(idx as i64)).collect();
    let asthma: Vec<bool> = (0..rows).map(|idx| idx % 2 == 0).collect();
    let droprate: Vec<Option<f64>> = (0..rows).map(|idx| Some(idx as f64 / 100.0)).collect();
    DataFrame::new(vec![
        Column::new("nct_id".into(), ids),
        Column::new("arms".into(), arms),
        Column::new("cond_asthma".into(), asthma),
        Column::new("droprate".into(), droprate),
    ])
    .unwrap()
}

#[test]
fn test_snapshot_round_trip_keeps_frame_and_manifest() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.arrow");
    let schema = schema();
    let vocabularies = vocabularies();
    let report = PipelineReport::default();
    let context = SnapshotContext {
        schema: &schema,
        vocabularies: &vocabularies,
        report: Some(&report),
    };

    let written = write_snapshot(&path, &frame(6), context).unwrap();
    assert!(manifest_path(&path).is_file());
    assert_eq!(written.rows, 6);
    assert_eq!(written.sha256.len(), 64);

    let loaded = read_snapshot(&path).unwrap();
    assert!(loaded.frame.equals_missing(&frame(6)));
    assert_eq!(loaded.manifest, written);
    assert_eq!(loaded.manifest.schema(), schema);
    assert_eq!(read_vocabularies(&path).unwrap(), vocabularies);
    assert_eq!(read_vocabularies(&manifest_path(&path)).unwrap(), vocabularies);
}

#[test]
fn test_tampered_table_fails_hash_check() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.arrow");
    let schema = schema();
    let vocabularies = vocabularies();
    let context = SnapshotContext {
        schema: &schema,
        vocabularies: &vocabularies,
        report: None,
    };
    write_snapshot(&path, &frame(4), context).unwrap();
    let other = dir.path().join("other.arrow");
    write_snapshot(&other, &frame(5), context).unwrap();
    fs::copy(&other, &path).unwrap();

    let err = read_snapshot(&path).unwrap_err();
    assert!(matches!(err, OutputError::HashMismatch { .. }));
}

#[test]
fn test_foreign_manifest_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.arrow");
    let schema = schema();
    let vocabularies = vocabularies();
    let context = SnapshotContext {
        schema: &schema,
        vocabularies: &vocabularies,
        report: None,
    };
    write_snapshot(&path, &frame(2), context).unwrap();

    let manifest = manifest_path(&path);
    let text = fs::read_to_string(&manifest)
        .unwrap()
        .replace("dropout-snapshot", "something-else");
    fs::write(&manifest, text).unwrap();

    let err = read_snapshot(&path).unwrap_err();
    assert!(matches!(err, OutputError::InvalidFormat { .. }));
}

#[test]
fn test_write_rejects_frame_that_disagrees_with_schema() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data.arrow");
    let schema = schema();
    let vocabularies = vocabularies();
    let context = SnapshotContext {
        schema: &schema,
        vocabularies: &vocabularies,
        report: None,
    };
    let frame = frame(3).drop("arms").unwrap();
    let err = write_snapshot(&path, &frame, context).unwrap_err();
    assert!(matches!(err, OutputError::SchemaMismatch { .. }));
    assert!(!path.exists());
}

#[test]
fn test_seeded_split_is_reproducible_and_disjoint() {
    let data = frame(10);
    let first = holdout_split(&data, 0.25, Some(7)).unwrap();
    let second = holdout_split(&data, 0.25, Some(7)).unwrap();
    assert_eq!(first.testing.height(), 3);
    assert_eq!(first.training.height(), 7);
    assert!(first.testing.equals_missing(&second.testing));

    let mut ids: Vec<String> = first
        .training
        .column("nct_id")
        .unwrap()
        .str()
        .unwrap()
        .into_no_null_iter()
        .chain(first.testing.column("nct_id").unwrap().str().unwrap().into_no_null_iter())
        .map(str::to_string)
        .collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 10);
}

#[test]
fn test_partitions_are_written_with_manifests() {
    let dir = tempdir().unwrap();
    let schema = schema();
    let vocabularies = vocabularies();
    let context = SnapshotContext {
        schema: &schema,
        vocabularies: &vocabularies,
        report: None,
    };
    let split = holdout_split(&frame(8), 0.25, Some(1)).unwrap();
    let files = write_partitions(dir.path(), "data", &split, context).unwrap();
    assert_eq!(files.training, dir.path().join("training_data.arrow"));
    assert_eq!(files.testing, dir.path().join("testing_data.arrow"));
    assert_eq!(files.testing_manifest.rows, 2);
    assert_eq!(read_snapshot(&files.training).unwrap().frame.height(), 6);
}

#[test]
fn test_empty_frame_splits_into_empty_partitions() {
    let split = holdout_split(&frame(0), 0.25, None).unwrap();
    assert_eq!(split.training.height(), 0);
    assert_eq!(split.testing.height(), 0);
    assert_eq!(split.training.width(), 4);
}
