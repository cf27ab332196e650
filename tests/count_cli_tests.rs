//! Integration tests for `ptstat count`
#![allow(deprecated)] // suppress assert_cmd::Command::cargo_bin deprecation in tests

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn write_input(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_count_prints_header_and_windows() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "ts.txt", "0.0\n5.0\n22.0\n");

    Command::cargo_bin("ptstat")
        .unwrap()
        .args(["count", "-i", &input, "-t", "10", "--boundary", "seconds-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Time(Sec)\tTime(nSec)\tPackets"))
        .stdout(predicate::str::contains("10 \t0 \t2"))
        .stdout(predicate::str::contains("20 \t0 \t0"))
        .stderr(predicate::str::contains("Elapsed time:"));
}

#[test]
fn test_count_default_boundary_needs_fraction_past_boundary() {
    // Default rule compares both fields; whole-second stamps never close a window
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "ts.txt", "0.0\n5.0\n22.0\n");

    Command::cargo_bin("ptstat")
        .unwrap()
        .args(["count", "-i", &input, "-t", "10", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::eq("window_end_sec,window_end_nsec,packets\n"));
}

#[test]
fn test_count_csv_fractional_window() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "ts.txt",
        "100.100000000\n100.200000000\n100.700000000\n101.300000000\n",
    );

    // seed 100.1 -> boundaries 100.6, 101.1 ...
    Command::cargo_bin("ptstat")
        .unwrap()
        .args([
            "count",
            "-i",
            &input,
            "-t",
            "0.5",
            "--boundary",
            "seconds-only",
            "--format",
            "csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("100,600000000,3"))
        .stdout(predicate::str::contains("101,100000000,0").not());
}

#[test]
fn test_count_json_with_flush_final() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "ts.txt", "0\n5\n22\n25\n");

    let output = Command::cargo_bin("ptstat")
        .unwrap()
        .args([
            "count",
            "-i",
            &input,
            "-t",
            "10",
            "--boundary",
            "seconds-only",
            "--flush-final",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["records"].as_array().unwrap().len(), 2);
    assert_eq!(value["partial"]["window_end_sec"], 30);
    assert_eq!(value["partial"]["packets"], 1);
    assert_eq!(value["summary"]["timestamps"], 4);
    assert_eq!(value["summary"]["interrupted"], false);
}

#[test]
fn test_count_reads_stdin() {
    Command::cargo_bin("ptstat")
        .unwrap()
        .args(["count", "-i", "-", "-t", "1", "--boundary", "seconds-only"])
        .write_stdin("1.5 IP 10.0.0.1.80 > 10.0.0.2.5000\n2.0\n4.0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 \t500000000 \t2"))
        .stdout(predicate::str::contains("3 \t500000000 \t0"));
}

#[test]
fn test_count_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "ts.txt", "0\n5\n22\n");
    let output = dir.path().join("counts.csv");

    Command::cargo_bin("ptstat")
        .unwrap()
        .args([
            "count",
            "-i",
            &input,
            "-t",
            "10",
            "--boundary",
            "seconds-only",
            "--format",
            "csv",
            "-o",
        ])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(output).unwrap();
    assert_eq!(
        written,
        "window_end_sec,window_end_nsec,packets\n10,0,2\n20,0,0\n"
    );
}

#[test]
fn test_count_rejects_non_positive_interval() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "ts.txt", "0\n");

    Command::cargo_bin("ptstat")
        .unwrap()
        .args(["count", "-i", &input, "-t", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_count_requires_interval() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "ts.txt", "0\n");

    Command::cargo_bin("ptstat")
        .unwrap()
        .args(["count", "-i", &input])
        .assert()
        .failure()
        .stderr(predicate::str::contains("window_length_seconds is required"));
}

#[test]
fn test_count_missing_input_file() {
    Command::cargo_bin("ptstat")
        .unwrap()
        .args(["count", "-i", "/nonexistent/ptstat.txt", "-t", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open input"));
}

#[test]
fn test_count_reports_bad_line() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "ts.txt", "1.0\n# comment\nnope\n");

    Command::cargo_bin("ptstat")
        .unwrap()
        .args(["count", "-i", &input, "-t", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"));
}

#[test]
fn test_count_uses_config_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "ts.txt", "0\n5\n22\n");
    let config = write_input(
        &dir,
        "ptstat.toml",
        "[count]\nwindow_length_seconds = 10.0\nboundary = \"seconds-only\"\n",
    );

    Command::cargo_bin("ptstat")
        .unwrap()
        .args(["--config", &config, "count", "-i", &input, "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10,0,2\n20,0,0\n"));
}

#[test]
fn test_count_cli_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "ts.txt", "0\n5\n22\n");
    let config = write_input(
        &dir,
        "ptstat.toml",
        "[count]\nwindow_length_seconds = 10.0\nboundary = \"seconds-only\"\n",
    );

    Command::cargo_bin("ptstat")
        .unwrap()
        .args([
            "--config", &config, "count", "-i", &input, "-t", "20", "--format", "csv",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("20,0,2\n"))
        .stdout(predicate::str::contains("10,0,").not());
}
