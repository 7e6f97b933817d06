//! Record aggregation tests

use fpbatch::services::aggregator::{AggregationError, Aggregator, LOCATION_KEY};
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_collect_writes_one_tagged_record_per_line() {
    let records = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    fs::create_dir_all(records.path().join("a/b")).unwrap();
    fs::write(
        records.path().join("a/b/one.json"),
        "{\n    \"DURATION\": \"10\",\n    \"ori_wav\": \"/music/a/b/one.wav\"\n}",
    )
    .unwrap();
    fs::write(records.path().join("two.json"), r#"{"DURATION": "20"}"#).unwrap();

    let output = out_dir.path().join("all.jsonl");
    let summary = Aggregator::default().collect(records.path(), &output).unwrap();

    assert_eq!(summary.found, 2);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.skipped, 0);

    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first["DURATION"], "10");
    assert_eq!(first["ori_wav"], "/music/a/b/one.wav");
    assert_eq!(
        first[LOCATION_KEY],
        records.path().join("a/b/one.json").to_string_lossy().into_owned()
    );
}

#[test]
fn test_malformed_record_is_skipped() {
    let records = TempDir::new().unwrap();
    let out_dir = TempDir::new().unwrap();
    fs::write(records.path().join("good.json"), r#"{"DURATION": "1"}"#).unwrap();
    fs::write(records.path().join("partial.json"), "{\n    \"DURATION\": ").unwrap();
    fs::write(records.path().join("list.json"), "[1, 2, 3]").unwrap();

    let output = out_dir.path().join("all.jsonl");
    let summary = Aggregator::default().collect(records.path(), &output).unwrap();

    assert_eq!(summary.found, 3);
    assert_eq!(summary.written, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 1);
}

#[test]
fn test_empty_tree_writes_empty_file() {
    let records = TempDir::new().unwrap();
    let output = records.path().join("all.jsonl");

    let summary = Aggregator::default().collect(records.path(), &output).unwrap();

    assert_eq!(summary.found, 0);
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}

#[test]
fn test_missing_input_directory() {
    let out_dir = TempDir::new().unwrap();
    let result = Aggregator::default().collect(
        std::path::Path::new("/nonexistent/records"),
        &out_dir.path().join("all.jsonl"),
    );
    assert!(matches!(result, Err(AggregationError::PathNotFound(_))));
}
