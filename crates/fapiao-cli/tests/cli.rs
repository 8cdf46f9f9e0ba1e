use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fapiao() -> Command {
    Command::cargo_bin("fapiao").unwrap()
}

/// A directory with two files that look like PDFs but are not.
fn garbage_inputs() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken-1.pdf"), b"not really a pdf").unwrap();
    fs::write(dir.path().join("broken-2.pdf"), b"%PDF-1.4 truncated").unwrap();
    fs::write(dir.path().join("ignored.txt"), b"skip me").unwrap();
    dir
}

#[test]
fn test_help_lists_commands() {
    fapiao()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("process"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_batch_writes_one_row_per_document() {
    let inputs = garbage_inputs();
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("result.csv");

    fapiao()
        .arg("batch")
        .arg(inputs.path())
        .arg("--output")
        .arg(&output)
        .arg("--text-only")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    let csv = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("file_name,invoice_number"));
    assert!(lines[1].starts_with("broken-1.pdf,"));
    assert!(lines[2].starts_with("broken-2.pdf,"));
    assert!(lines[1].ends_with("Failed: NoTextExtracted"));
}

#[test]
fn test_batch_json_output() {
    let inputs = garbage_inputs();
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("nested").join("result.json");

    fapiao()
        .args(["batch", "--format", "json", "--text-only", "--output"])
        .arg(&output)
        .arg(inputs.path())
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["source_file_name"], "broken-1.pdf");
    assert_eq!(records[0]["status"]["kind"], "failed");
}

#[test]
fn test_batch_without_matches_fails() {
    let dir = tempfile::tempdir().unwrap();

    fapiao()
        .arg("batch")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn test_process_missing_models_still_produces_a_record() {
    let inputs = garbage_inputs();
    let empty_models = tempfile::tempdir().unwrap();

    fapiao()
        .arg("process")
        .arg(inputs.path().join("broken-1.pdf"))
        .arg("--model-dir")
        .arg(empty_models.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source_file_name\": \"broken-1.pdf\""))
        .stdout(predicate::str::contains("NoTextExtracted"));
}

#[test]
fn test_config_show_uses_given_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "extraction": { "max_line_items": 3 } }"#).unwrap();

    fapiao()
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"max_line_items\": 3"))
        .stdout(predicate::str::contains("\"min_native_chars\": 50"));
}

#[test]
fn test_config_init_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fapiao.json");

    fapiao()
        .args(["config", "init", "--strict", "--config"])
        .arg(&path)
        .assert()
        .success();

    fapiao()
        .args(["config", "get", "extraction.invoice_number_min_digits", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("18"));

    fapiao()
        .args(["config", "init", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
