//! Concurrency tests for the fitglass binary.
//!
//! These tests verify that multiple processes can safely append to the
//! journal, compact it, read it and edit the profile while others write.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fitglass"));
    cmd.env("FITGLASS_CONFIG", data_dir.join("no-config.toml"))
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn log_day(data_dir: &Path, day: u32) {
    cli(data_dir)
        .args([
            "log",
            "--date",
            &format!("2024-07-{:02}", day),
            "--calories",
            "1400",
            "--steps",
            "6000",
        ])
        .assert()
        .success();
}

#[test]
fn test_sequential_logging() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    for day in 1..=5 {
        thread::sleep(Duration::from_millis(u64::from(day) * 5));
        log_day(data_dir, day);
    }

    let journal = std::fs::read_to_string(data_dir.join("journal/daily_logs.wal"))
        .expect("Failed to read journal");
    assert_eq!(journal.lines().count(), 5);
}

#[test]
fn test_concurrent_logging_of_distinct_days() {
    let temp_dir = setup_test_dir();
    let data_dir: PathBuf = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (1..=8)
        .map(|day| {
            let data_dir = data_dir.clone();
            thread::spawn(move || log_day(&data_dir, day))
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let output = cli(&data_dir).arg("history").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 8, "history:\n{}", stdout);
}

#[test]
fn test_concurrent_reads_and_writes() {
    let temp_dir = setup_test_dir();
    let data_dir: PathBuf = temp_dir.path().to_path_buf();
    log_day(&data_dir, 1);

    let writer_dir = data_dir.clone();
    let writer = thread::spawn(move || {
        for day in 2..=4 {
            log_day(&writer_dir, day);
        }
    });

    let reader_dir = data_dir.clone();
    let reader = thread::spawn(move || {
        for _ in 0..3 {
            cli(&reader_dir)
                .args(["summary", "--today", "2024-07-05", "--json"])
                .assert()
                .success();
        }
    });

    writer.join().expect("Writer panicked");
    reader.join().expect("Reader panicked");

    let output = cli(&data_dir).arg("history").output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 4);
}

#[test]
fn test_logging_during_compaction() {
    let temp_dir = setup_test_dir();
    let data_dir: PathBuf = temp_dir.path().to_path_buf();
    log_day(&data_dir, 1);

    let writer_dir = data_dir.clone();
    let writer = thread::spawn(move || {
        for day in 2..=9 {
            log_day(&writer_dir, day);
        }
    });

    let compactor_dir = data_dir.clone();
    let compactor = thread::spawn(move || {
        for _ in 0..5 {
            cli(&compactor_dir).arg("compact").assert().success();
        }
    });

    writer.join().expect("Writer panicked");
    compactor.join().expect("Compactor panicked");

    let output = cli(&data_dir).arg("history").output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 9, "history:\n{}", stdout);
}

#[test]
fn test_concurrent_profile_edits_all_apply() {
    let temp_dir = setup_test_dir();
    let data_dir: PathBuf = temp_dir.path().to_path_buf();

    let edits: [[&str; 2]; 6] = [
        ["--name", "Robin"],
        ["--age", "33"],
        ["--weight", "80"],
        ["--protein-goal", "120"],
        ["--calorie-goal", "1800"],
        ["--step-goal", "9000"],
    ];

    let handles: Vec<_> = edits
        .iter()
        .map(|edit| {
            let data_dir = data_dir.clone();
            let edit = *edit;
            thread::spawn(move || {
                cli(&data_dir)
                    .args(["profile", "set"])
                    .args(edit)
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let contents = std::fs::read_to_string(data_dir.join("profile.json")).unwrap();
    let profile: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(profile["name"], "Robin");
    assert_eq!(profile["age"], 33);
    assert_eq!(profile["weight"], 80.0);
    assert_eq!(profile["proteinGoal"], 120);
    assert_eq!(profile["calorieGoal"], 1800);
    assert_eq!(profile["stepGoal"], 9000);
}
