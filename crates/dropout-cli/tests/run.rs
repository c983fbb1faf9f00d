use std::fs;
use std::path::Path;

use clap::Parser;
use tempfile::tempdir;

use dropout_cli::cli::Cli;
use dropout_cli::commands::{TableOrigin, run, sibling_testing_path};

fn write_table(dir: &Path, name: &str, rows: &[&str]) {
    fs::write(dir.join(format!("{name}.txt")), rows.join("\n") + "\n").unwrap();
}

/// Four studies; NCT3 reports one more withdrawal than NOT COMPLETED.
fn write_fixture(dir: &Path) {
    write_table(
        dir,
        "drop_withdrawals",
        &["id|nct_id|count", "1|NCT1|2", "2|NCT1|1", "3|NCT2|4", "4|NCT3|2", "5|NCT4|0"],
    );
    write_table(
        dir,
        "studies",
        &[
            "nct_id|enrollment|enrollment_type|study_type|overall_status|phase|number_of_arms",
            "NCT1|10|Actual|Interventional|Completed|Phase 2|2",
            "NCT2|20|Actual|Interventional|Completed|Phase 3|3",
            "NCT3|30|Actual|Interventional|Completed|Phase 1/Phase 2|2",
            "NCT4|40|Actual|Interventional|Completed||1",
        ],
    );
    write_table(
        dir,
        "milestones",
        &[
            "nct_id|title|count",
            "NCT1|STARTED|10",
            "NCT1|COMPLETED|7",
            "NCT1|NOT COMPLETED|3",
            "NCT2|STARTED|20",
            "NCT2|COMPLETED|16",
            "NCT2|NOT COMPLETED|4",
            "NCT3|STARTED|30",
            "NCT3|COMPLETED|29",
            "NCT3|NOT COMPLETED|1",
            "NCT4|STARTED|40",
            "NCT4|COMPLETED|40",
            "NCT4|NOT COMPLETED|0",
        ],
    );
    write_table(
        dir,
        "baseline_measurements",
        &[
            "nct_id|category|classification|param_value_num",
            "NCT1|Female||6",
            "NCT1|Male||4",
            "NCT2|Female||20",
        ],
    );
    write_table(
        dir,
        "browse_conditions",
        &["nct_id|mesh_term", "NCT1|Asthma", "NCT2|Asthma", "NCT4|Gout"],
    );
    write_table(
        dir,
        "browse_interventions",
        &["nct_id|mesh_term", "NCT1|Albuterol"],
    );
    write_table(
        dir,
        "calculated_values",
        &[
            "nct_id|number_of_facilities|registered_in_calendar_year|actual_duration|has_us_facility|minimum_age_num|maximum_age_num|minimum_age_unit|maximum_age_unit",
            "NCT1|1|2010|12|t|18|65|Years|Years",
            "NCT2|4|2012|24|f|18||Years|",
            "NCT4|2|2015|6|t|6|17|Months|Years",
        ],
    );
    write_table(
        dir,
        "interventions",
        &["nct_id|intervention_type", "NCT1|Drug", "NCT2|Behavioral", "NCT4|Drug"],
    );
    write_table(dir, "keywords", &["nct_id|name", "NCT2|asthma control"]);
}

#[test]
fn test_nothing_requested_is_not_an_error() {
    let cli = Cli::parse_from(["dropout", "--plot"]);
    assert!(run(&cli).unwrap().is_none());
}

#[test]
fn test_getdata_savedata_then_loaddata() {
    let source = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_fixture(source.path());

    let source_dir = source.path().to_str().unwrap();
    let output_dir = output.path().to_str().unwrap();
    let cli = Cli::parse_from([
        "dropout",
        "--getdata",
        "--savedata",
        "--plot",
        "--source-dir",
        source_dir,
        "--output-dir",
        output_dir,
        "--seed",
        "11",
    ]);
    let outcome = run(&cli).unwrap().unwrap();
    assert_eq!(outcome.rows, 3);
    assert_eq!(outcome.split, Some((2, 1)));
    assert!(matches!(outcome.origin, TableOrigin::Assembled { .. }));

    let report = outcome.report.as_ref().unwrap();
    assert_eq!(report.total_dropped(), 2);

    let saved = outcome.saved.as_ref().unwrap();
    assert!(saved.snapshot.is_file());
    assert!(output.path().join("data.manifest.json").is_file());
    assert_eq!(saved.training, output.path().join("training_data.arrow"));
    assert!(saved.testing.is_file());

    let summary = outcome.explore.as_ref().unwrap();
    assert_eq!(summary.histogram.total(), 3);

    let training = saved.training.to_str().unwrap();
    let cli = Cli::parse_from(["dropout", "--loaddata", training, "--getdata"]);
    let loaded = run(&cli).unwrap().unwrap();
    assert_eq!(loaded.rows, 2);
    assert_eq!(loaded.split, Some((2, 1)));
    assert!(matches!(loaded.origin, TableOrigin::Loaded { .. }));
    assert_eq!(loaded.report, outcome.report);
}

#[test]
fn test_vocabulary_is_reused_from_a_previous_snapshot() {
    let source = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_fixture(source.path());
    let source_dir = source.path().to_str().unwrap();
    let output_dir = output.path().to_str().unwrap();

    let first = Cli::parse_from([
        "dropout",
        "--getdata",
        "--savedata",
        "--top-k",
        "1",
        "--source-dir",
        source_dir,
        "--output-dir",
        output_dir,
    ]);
    run(&first).unwrap();

    // Rewrite conditions so a refit would pick a different top term.
    write_table(
        source.path(),
        "browse_conditions",
        &["nct_id|mesh_term", "NCT1|Gout", "NCT2|Gout", "NCT4|Asthma"],
    );
    let manifest = output.path().join("data.manifest.json");
    let second = Cli::parse_from([
        "dropout",
        "--getdata",
        "--source-dir",
        source_dir,
        "--vocabulary",
        manifest.to_str().unwrap(),
    ]);
    let outcome = run(&second).unwrap().unwrap();
    assert_eq!(outcome.rows, 3);
    // 17 fixed columns plus cond_asthma, intv_albuterol, keyword_asthmacontrol,
    // intvtype_behavioral and intvtype_drug. A refit at the default top-k
    // would add cond_gout.
    assert_eq!(outcome.columns, 17 + 5);
}

#[test]
fn test_missing_source_table_is_an_error() {
    let source = tempdir().unwrap();
    let cli = Cli::parse_from([
        "dropout",
        "--getdata",
        "--source-dir",
        source.path().to_str().unwrap(),
    ]);
    let err = run(&cli).unwrap_err();
    assert!(format!("{err:#}").contains("not found"));
}

#[test]
fn test_testing_sibling_path() {
    assert_eq!(
        sibling_testing_path(Path::new("out/training_data.arrow")),
        Some(Path::new("out/testing_data.arrow").to_path_buf())
    );
    assert_eq!(sibling_testing_path(Path::new("out/data.arrow")), None);
}

fn write_generated(dir: &Path, name: &str, header: &str, rows: impl Iterator<Item = String>) {
    let mut contents = String::from(header);
    for row in rows {
        contents.push('\n');
        contents.push_str(&row);
    }
    contents.push('\n');
    fs::write(dir.join(format!("{name}.txt")), contents).unwrap();
}

/// Twelve consistent studies with every predictor present and a distinct
/// dropout rate each, so both partitions have complete cases.
fn write_fit_fixture(dir: &Path) {
    let ids = || 1..=12u32;
    write_generated(
        dir,
        "drop_withdrawals",
        "nct_id|count",
        ids().map(|i| format!("NCT{i:02}|{i}")),
    );
    write_generated(
        dir,
        "studies",
        "nct_id|enrollment|enrollment_type|study_type|overall_status|phase|number_of_arms",
        ids().map(|i| {
            format!(
                "NCT{i:02}|{}|Actual|Interventional|Completed|Phase {}|{}",
                40 + 2 * i,
                i % 4 + 1,
                i % 3 + 1
            )
        }),
    );
    write_generated(
        dir,
        "milestones",
        "nct_id|title|count",
        ids().flat_map(|i| {
            let enrolled = 40 + 2 * i;
            [
                format!("NCT{i:02}|STARTED|{enrolled}"),
                format!("NCT{i:02}|COMPLETED|{}", enrolled - i),
                format!("NCT{i:02}|NOT COMPLETED|{i}"),
            ]
        }),
    );
    write_generated(
        dir,
        "baseline_measurements",
        "nct_id|category|classification|param_value_num",
        ids().flat_map(|i| {
            [
                format!("NCT{i:02}|Female||{}", i + 5),
                format!("NCT{i:02}|Male||{}", 30 - i),
            ]
        }),
    );
    write_generated(
        dir,
        "browse_conditions",
        "nct_id|mesh_term",
        ids().map(|i| format!("NCT{i:02}|{}", if i % 2 == 0 { "Asthma" } else { "Gout" })),
    );
    write_generated(
        dir,
        "browse_interventions",
        "nct_id|mesh_term",
        ids().map(|i| format!("NCT{i:02}|Albuterol")),
    );
    write_generated(
        dir,
        "calculated_values",
        "nct_id|number_of_facilities|registered_in_calendar_year|actual_duration|has_us_facility|minimum_age_num|maximum_age_num|minimum_age_unit|maximum_age_unit",
        ids().map(|i| {
            format!(
                "NCT{i:02}|{}|{}|{}|{}|18|{}|Years|Years",
                i % 4 + 1,
                2005 + i,
                6 * i,
                if i % 2 == 0 { "t" } else { "f" },
                60 + i
            )
        }),
    );
    write_generated(
        dir,
        "interventions",
        "nct_id|intervention_type",
        ids().map(|i| format!("NCT{i:02}|{}", if i % 3 == 0 { "Behavioral" } else { "Drug" })),
    );
    write_generated(
        dir,
        "keywords",
        "nct_id|name",
        ids().map(|i| format!("NCT{i:02}|asthma control")),
    );
}

#[test]
fn test_fit_uses_training_partition_and_scores_testing() {
    let source = tempdir().unwrap();
    write_fit_fixture(source.path());
    let cli = Cli::parse_from([
        "dropout",
        "--getdata",
        "--fit",
        "--seed",
        "5",
        "--source-dir",
        source.path().to_str().unwrap(),
    ]);
    let outcome = run(&cli).unwrap().unwrap();
    assert_eq!(outcome.rows, 12);
    assert_eq!(outcome.split, Some((9, 3)));

    let fit = outcome.fit.as_ref().unwrap();
    assert_eq!(fit.fitted_on, "training");
    assert_eq!(fit.fit.observations, 9);
    assert!(fit.fit.estimate("intercept").is_some());
    // The single keyword and intervention term are constant, so aliased.
    let aliased: Vec<&str> = fit.fit.aliased().collect();
    assert!(aliased.contains(&"keyword_asthmacontrol"));
    assert!(aliased.contains(&"intv_albuterol"));
    assert!(fit.test_r_squared.is_some_and(f64::is_finite));
}

#[test]
fn test_fit_on_loaded_full_snapshot_uses_all_rows() {
    let source = tempdir().unwrap();
    let output = tempdir().unwrap();
    write_fit_fixture(source.path());
    let first = Cli::parse_from([
        "dropout",
        "--getdata",
        "--savedata",
        "--seed",
        "5",
        "--source-dir",
        source.path().to_str().unwrap(),
        "--output-dir",
        output.path().to_str().unwrap(),
    ]);
    run(&first).unwrap();

    let snapshot = output.path().join("data.arrow");
    let cli = Cli::parse_from(["dropout", "--loaddata", snapshot.to_str().unwrap(), "--fit"]);
    let outcome = run(&cli).unwrap().unwrap();
    assert_eq!(outcome.split, None);

    let fit = outcome.fit.as_ref().unwrap();
    assert_eq!(fit.fitted_on, "all rows");
    assert_eq!(fit.fit.observations, 12);
    assert_eq!(fit.test_r_squared, None);
    assert!(fit.fit.r_squared.is_some());
}
