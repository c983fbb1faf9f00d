use std::fs;
use std::path::Path;

use tempfile::TempDir;

use dropout_ingest::{
    FlatFileSource, IngestError, TableSource, fetch_calculated, fetch_keywords, fetch_withdrawals,
};

fn write_table(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).expect("write table");
}

#[test]
fn test_reads_pipe_delimited_tables_as_text() {
    let dir = TempDir::new().expect("temp dir");
    write_table(
        dir.path(),
        "drop_withdrawals.txt",
        "id|nct_id|period|reason|count\n1|NCT001|Overall|Adverse Event|3\n2|NCT001|Overall|Lost|2\n3|NCT002|Overall|Other|\n",
    );
    let source = FlatFileSource::new(dir.path());

    let df = source
        .fetch("drop_withdrawals", &["nct_id", "count"])
        .expect("fetch");
    assert_eq!(df.width(), 2);
    assert_eq!(df.height(), 3);

    let records = fetch_withdrawals(&source).expect("records");
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].study_id.as_str(), "NCT001");
    assert_eq!(records[0].count, Some(3));
    assert_eq!(records[2].count, None);
}

#[test]
fn test_honours_custom_extension_and_delimiter() {
    let dir = TempDir::new().expect("temp dir");
    write_table(
        dir.path(),
        "calculated_values.csv",
        "nct_id,number_of_facilities,registered_in_calendar_year,actual_duration,has_us_facility,minimum_age_num,maximum_age_num,minimum_age_unit,maximum_age_unit\n\
         NCT001,4,2009,18,t,18,65,Years,Years\n\
         NCT002,,2011,,f,6,,Months,\n",
    );
    let source = FlatFileSource::new(dir.path())
        .with_extension(".csv")
        .with_delimiter(b',');

    let records = fetch_calculated(&source).expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].facilities, Some(4));
    assert_eq!(records[0].has_us_facility, Some(true));
    assert_eq!(records[0].actual_duration, Some(18.0));
    assert_eq!(records[1].facilities, None);
    assert_eq!(records[1].has_us_facility, Some(false));
    assert_eq!(records[1].minimum_age_unit.as_deref(), Some("Months"));
    assert_eq!(records[1].maximum_age, None);
}

#[test]
fn test_missing_table_file_names_the_table() {
    let dir = TempDir::new().expect("temp dir");
    let source = FlatFileSource::new(dir.path());
    let err = source.fetch("milestones", &["nct_id"]).unwrap_err();
    assert!(matches!(err, IngestError::MissingTable { .. }));
    assert_eq!(err.table(), "milestones");
    assert_eq!(
        source.table_path("milestones"),
        dir.path().join("milestones.txt")
    );
}

#[test]
fn test_missing_column_names_table_and_column() {
    let dir = TempDir::new().expect("temp dir");
    write_table(dir.path(), "keywords.txt", "id|nct_id|downcase_name\n1|NCT001|asthma\n");
    let source = FlatFileSource::new(dir.path());
    let err = source.fetch("keywords", &["nct_id", "name"]).unwrap_err();
    match err {
        IngestError::MissingColumn { table, column } => {
            assert_eq!(table, "keywords");
            assert_eq!(column, "name");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_stray_quotes_in_free_text_are_kept_verbatim() {
    let dir = TempDir::new().expect("temp dir");
    write_table(
        dir.path(),
        "keywords.txt",
        "id|nct_id|name\n1|NCT001|\"Smith\" criteria\n2|NCT001|asthma\n3|NCT002|6\" walk test\n4|NCT003|\"\n",
    );
    let source = FlatFileSource::new(dir.path());

    let records = fetch_keywords(&source).expect("records");
    let terms: Vec<Option<&str>> = records.iter().map(|record| record.term.as_deref()).collect();
    assert_eq!(
        terms,
        vec![
            Some("\"Smith\" criteria"),
            Some("asthma"),
            Some("6\" walk test"),
            Some("\""),
        ]
    );
}
