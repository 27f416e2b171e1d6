//! End-to-end tests running the compiled `intake` binary
//!
//! Only terminating invocations are exercised here: drain runs and startup
//! failures. The long-running watch loop itself is covered by the watcher
//! crate's tests.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn intake(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_intake"))
        .args(args)
        .output()
        .expect("failed to run intake binary")
}

fn seed_folder(root: &Path, name: &str, files: &[(&str, &str)]) {
    let folder = root.join(name);
    fs::create_dir(&folder).unwrap();
    for (file, contents) in files {
        fs::write(folder.join(file), contents).unwrap();
    }
}

#[test]
fn test_help_lists_subcommands() {
    let output = intake(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("watch"));
    assert!(stdout.contains("drain"));
}

#[test]
fn test_watch_missing_root_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent");

    let output = intake(&["watch", missing.to_str().unwrap(), "--dry-run"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_watch_without_uploader_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();

    let output = intake(&["watch", temp_dir.path().to_str().unwrap()]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--dry-run"));
}

#[test]
fn test_drain_empty_directory_succeeds() {
    let temp_dir = TempDir::new().unwrap();

    let output = intake(&["drain", temp_dir.path().to_str().unwrap(), "--dry-run"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Nothing to upload"));
}

#[cfg(unix)]
#[test]
fn test_drain_runs_upload_command_per_folder() {
    let temp_dir = TempDir::new().unwrap();
    let drop_dir = temp_dir.path().join("drop");
    fs::create_dir(&drop_dir).unwrap();
    seed_folder(&drop_dir, "invoice-0042", &[("scan.pdf", "bytes")]);
    seed_folder(&drop_dir, "invoice-0043", &[("scan.pdf", "bytes")]);

    // The upload command appends each folder name it receives to a log file
    let log = temp_dir.path().join("uploads.log");
    let script = format!("basename \"$1\" >> {}", log.display());

    let output = intake(&[
        "drain",
        drop_dir.to_str().unwrap(),
        "--",
        "sh",
        "-c",
        &script,
        "sh",
    ]);
    assert!(output.status.success());

    let mut uploaded: Vec<String> = fs::read_to_string(&log)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    uploaded.sort();
    assert_eq!(uploaded, ["invoice-0042", "invoice-0043"]);
}

#[cfg(unix)]
#[test]
fn test_drain_exits_nonzero_when_all_uploads_fail() {
    let temp_dir = TempDir::new().unwrap();
    seed_folder(temp_dir.path(), "invoice-0042", &[("scan.pdf", "bytes")]);

    let output = intake(&[
        "drain",
        temp_dir.path().to_str().unwrap(),
        "--",
        "false",
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_drain_folder_filter_rejects_unknown_name() {
    let temp_dir = TempDir::new().unwrap();
    seed_folder(temp_dir.path(), "invoice-0042", &[("scan.pdf", "bytes")]);

    let output = intake(&[
        "drain",
        temp_dir.path().to_str().unwrap(),
        "--folder",
        "no-such-folder",
        "--dry-run",
    ]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no-such-folder"));
}

#[test]
fn test_invalid_poll_interval_rejected() {
    let temp_dir = TempDir::new().unwrap();

    let output = intake(&[
        "watch",
        temp_dir.path().to_str().unwrap(),
        "--poll-interval",
        "0",
        "--dry-run",
    ]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("poll_interval"));
}
