//! Integration tests for the assessment merge pipeline.
//!
//! These tests run the pipeline end to end against the exports under
//! `tests/fixtures/assessments` and inspect the files it writes.

use assessment_merge::reporting::UTF8_BOM;
use assessment_merge::stats::crosstab::AGE_GROUP_BY_TYPE;
use assessment_merge::{
    MergeConfig, MergeError, MergeResult, MergeStage, Pipeline, SummaryValue, analyze,
    load_records,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/assessments")
}

fn config(input: &Path, output: &Path) -> MergeConfig {
    MergeConfig::builder()
        .input_dir(input)
        .output_dir(output)
        .build()
        .unwrap()
}

fn run(input: &Path, output: &Path) -> MergeResult {
    Pipeline::builder()
        .config(config(input, output))
        .build()
        .unwrap()
        .run()
        .unwrap()
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

// ============================================================================
// Full Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_fixtures() {
    let output = TempDir::new().unwrap();
    let result = run(&fixtures_path(), output.path());

    assert_eq!(result.records_found, 5);
    assert_eq!(result.records_loaded, 3);
    assert_eq!(result.rows, 3);
    // 28 fixed columns plus six distinct questionnaire answers
    assert_eq!(result.columns, 34);

    let skipped: Vec<&str> = result.skipped.iter().map(|s| s.file_name.as_str()).collect();
    assert_eq!(skipped, vec!["malformed.json", "not_an_object.json"]);
}

#[test]
fn test_summary_statistics_from_fixtures() {
    let output = TempDir::new().unwrap();
    let summary = run(&fixtures_path(), output.path()).summary;

    assert_eq!(summary.get("case_count"), Some(&SummaryValue::Count(3)));
    assert_eq!(
        summary.get("earliest_assessment_date"),
        Some(&SummaryValue::Text("2024-01-19".to_string()))
    );
    assert_eq!(
        summary.get("latest_assessment_date"),
        Some(&SummaryValue::Text("2024-04-10".to_string()))
    );
    assert_eq!(summary.get("mean_age"), Some(&SummaryValue::Number(71.3)));
    assert_eq!(summary.get("median_age"), Some(&SummaryValue::Number(72.0)));
    assert_eq!(summary.get("min_age"), Some(&SummaryValue::Number(58.0)));
    assert_eq!(summary.get("max_age"), Some(&SummaryValue::Number(84.0)));
    assert_eq!(summary.get("gender_F"), Some(&SummaryValue::Count(2)));
    assert_eq!(summary.get("gender_M"), Some(&SummaryValue::Count(1)));
    assert_eq!(summary.get("risk_high"), Some(&SummaryValue::Count(2)));
    assert_eq!(
        summary.get("mean_adl_impairment"),
        Some(&SummaryValue::Number(1.98))
    );
    assert_eq!(summary.get("type_AD"), Some(&SummaryValue::Count(1)));
    assert_eq!(summary.get("type_DLB"), Some(&SummaryValue::Count(1)));
    assert_eq!(summary.get("type_VaD"), Some(&SummaryValue::Count(1)));
}

#[test]
fn test_risk_distribution_from_fixtures() {
    let output = TempDir::new().unwrap();
    let result = run(&fixtures_path(), output.path());

    let risk = &result.distributions[0];
    let entries: Vec<(&str, usize, f64)> = risk
        .entries
        .iter()
        .map(|e| (e.category.as_str(), e.count, e.percentage))
        .collect();
    assert_eq!(entries, vec![("high", 2, 66.67), ("low", 1, 33.33)]);
}

#[test]
fn test_age_crosstab_from_fixtures() {
    let output = TempDir::new().unwrap();
    let result = run(&fixtures_path(), output.path());

    let tab = result
        .crosstabs
        .iter()
        .find(|t| t.name == AGE_GROUP_BY_TYPE)
        .unwrap();
    assert_eq!(tab.row_labels, vec!["<60", "70-79", "80+"]);
    assert_eq!(tab.count("<60", "DLB"), Some(1));
    assert_eq!(tab.count("70-79", "AD"), Some(1));
    assert_eq!(tab.count("80+", "VaD"), Some(1));
    assert_eq!(tab.grand_total(), 3);
}

// ============================================================================
// Output File Tests
// ============================================================================

#[test]
fn test_writes_timestamped_and_latest_files() {
    let output = TempDir::new().unwrap();
    let result = run(&fixtures_path(), output.path());

    let names = file_names(&result.written_files);
    assert_eq!(names.len(), 4);
    assert!(names[0].starts_with("all_assessments_") && names[0].ends_with(".csv"));
    assert!(names[1].ends_with(".xlsx"));
    assert_eq!(names[2], "all_assessments_latest.csv");
    assert_eq!(names[3], "all_assessments_latest.xlsx");

    // <stem>_YYYYMMDD_HHMMSS.csv
    let stamp = names[0]
        .trim_start_matches("all_assessments_")
        .trim_end_matches(".csv");
    assert_eq!(stamp.len(), 15);
    assert_eq!(&stamp[8..9], "_");

    let timestamped = fs::read(&result.written_files[0]).unwrap();
    let latest = fs::read(&result.written_files[2]).unwrap();
    assert_eq!(timestamped, latest);

    let timestamped_xlsx = fs::read(&result.written_files[1]).unwrap();
    let latest_xlsx = fs::read(&result.written_files[3]).unwrap();
    assert_eq!(timestamped_xlsx, latest_xlsx);
}

#[test]
fn test_csv_has_bom_header_and_rows() {
    let output = TempDir::new().unwrap();
    run(&fixtures_path(), output.path());

    let bytes = fs::read(output.path().join("all_assessments_latest.csv")).unwrap();
    assert!(bytes.starts_with(UTF8_BOM));

    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    let mut lines = text.lines();
    let header: Vec<&str> = lines.next().unwrap().split(',').collect();
    assert_eq!(header[0], "file_name");
    assert!(header.contains(&"response_gait_1"));
    assert!(header.contains(&"most_likely_type"));

    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("case_001.json,"));
    assert!(text.contains("\"Wang, Shu-Fen\""));
}

#[test]
fn test_latest_csv_is_stable_across_runs() {
    let output = TempDir::new().unwrap();
    let latest = output.path().join("all_assessments_latest.csv");

    run(&fixtures_path(), output.path());
    let first = fs::read(&latest).unwrap();
    run(&fixtures_path(), output.path());
    let second = fs::read(&latest).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_latest_only() {
    let output = TempDir::new().unwrap();
    let config = MergeConfig::builder()
        .input_dir(fixtures_path())
        .output_dir(output.path())
        .file_stem("clinic")
        .write_timestamped(false)
        .build()
        .unwrap();

    let result = Pipeline::builder().config(config).build().unwrap().run().unwrap();
    assert_eq!(
        file_names(&result.written_files),
        vec!["clinic_latest.csv", "clinic_latest.xlsx"]
    );
}

// ============================================================================
// Error Handling Tests
// ============================================================================

#[test]
fn test_missing_input_directory_is_fatal() {
    let output = TempDir::new().unwrap();
    let missing = output.path().join("does-not-exist");

    let err = Pipeline::builder()
        .config(config(&missing, output.path()))
        .build()
        .unwrap()
        .run()
        .unwrap_err();

    assert!(matches!(err, MergeError::InputDirNotFound(_)));
    assert!(!err.is_recoverable());
    assert_eq!(err.error_code(), "INPUT_DIR_NOT_FOUND");
}

#[test]
fn test_empty_directory_writes_nothing() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let report_dir = output.path().join("reports");

    let err = Pipeline::builder()
        .config(config(input.path(), &report_dir))
        .build()
        .unwrap()
        .run()
        .unwrap_err();

    assert!(matches!(err, MergeError::NoRecordsLoaded(_)));
    assert!(err.is_recoverable());
    assert!(!report_dir.exists());
}

// ============================================================================
// Progress and Determinism Tests
// ============================================================================

#[test]
fn test_progress_ends_with_complete() {
    let output = TempDir::new().unwrap();
    let updates = Arc::new(Mutex::new(Vec::new()));
    let updates_clone = updates.clone();

    Pipeline::builder()
        .config(config(&fixtures_path(), output.path()))
        .on_progress(move |update| updates_clone.lock().unwrap().push(update))
        .build()
        .unwrap()
        .run()
        .unwrap();

    let updates = updates.lock().unwrap();
    let last = updates.last().unwrap();
    assert_eq!(last.stage, MergeStage::Complete);
    assert_eq!(last.progress, 1.0);
    assert!(updates.windows(2).all(|w| w[0].progress <= w[1].progress));
}

#[test]
fn test_record_order_does_not_change_aggregates() {
    let outcome = load_records(&fixtures_path(), "json").unwrap();
    let forward = analyze(&outcome.records);

    let mut reversed = outcome.records.clone();
    reversed.reverse();
    let backward = analyze(&reversed);

    assert_eq!(forward.risk_distribution, backward.risk_distribution);
    assert_eq!(forward.crosstabs, backward.crosstabs);

    let mut forward_columns = forward.table.columns().to_vec();
    let mut backward_columns = backward.table.columns().to_vec();
    forward_columns.sort();
    backward_columns.sort();
    assert_eq!(forward_columns, backward_columns);
}
