//! CLI tests for the symlink-walker binary
//!
//! Exercise exit codes and the stdout/stderr split.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::symlink;
use std::process::Command;
use tempfile::tempdir;

fn run_cli(args: &[&str]) -> (String, String, Option<i32>) {
    let output = Command::new(env!("CARGO_BIN_EXE_symlink-walker"))
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (stdout, stderr, output.status.code())
}

#[test]
fn test_cli_help() {
    for flag in ["-h", "--help"] {
        let (stdout, _, code) = run_cli(&[flag]);

        assert_eq!(code, Some(0));
        assert!(stdout.contains("TARGET"));
        assert!(stdout.contains("SEARCH_DIR"));
    }
}

#[test]
fn test_cli_missing_arguments() {
    let (stdout, stderr, code) = run_cli(&[]);
    assert_eq!(code, Some(1));
    assert!(stdout.is_empty());
    assert!(stderr.contains("TARGET"));

    let (_, stderr, code) = run_cli(&["/tmp"]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("SEARCH_DIR"));
}

#[test]
fn test_cli_too_many_arguments() {
    let (_, _, code) = run_cli(&["/a", "/b", "/c"]);
    assert_eq!(code, Some(1));
}

#[test]
fn test_cli_unknown_flag() {
    let (_, _, code) = run_cli(&["--no-such-flag", "/a", "/b"]);
    assert_eq!(code, Some(1));
}

#[test]
fn test_cli_missing_search_dir() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target");
    fs::write(&target, b"").unwrap();
    let missing = dir.path().join("missing");

    let (stdout, stderr, code) = run_cli(&[target.to_str().unwrap(), missing.to_str().unwrap()]);

    assert_eq!(code, Some(1));
    assert!(stdout.is_empty());
    assert_eq!(stderr.lines().count(), 1);
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_cli_dangling_search_dir() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target");
    fs::write(&target, b"").unwrap();
    let root = dir.path().join("root");
    symlink(dir.path().join("gone"), &root).unwrap();

    let (stdout, stderr, code) = run_cli(&[target.to_str().unwrap(), root.to_str().unwrap()]);

    assert_eq!(code, Some(1));
    assert!(stdout.is_empty());
    assert_eq!(stderr.lines().count(), 1);
    assert!(stderr.contains("does not exist"));
}

#[test]
fn test_cli_search_dir_through_aliased_ancestor() {
    let dir = tempdir().unwrap();
    let base = fs::canonicalize(dir.path()).unwrap();
    fs::create_dir_all(base.join("real/root")).unwrap();
    fs::write(base.join("real/target"), b"").unwrap();
    symlink("../target", base.join("real/root/link")).unwrap();
    symlink(base.join("real"), base.join("alias")).unwrap();

    let target = base.join("real/target");
    let root = base.join("alias/root");
    let (stdout, _, code) = run_cli(&[target.to_str().unwrap(), root.to_str().unwrap()]);

    assert_eq!(code, Some(0));
    let expected = base.join("real/root/link");
    assert_eq!(stdout.trim_end(), expected.to_str().unwrap());
}

#[test]
fn test_cli_unreachable_target() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("no-target");

    let (stdout, _, code) = run_cli(&[missing.to_str().unwrap(), dir.path().to_str().unwrap()]);

    assert_eq!(code, Some(1));
    assert!(stdout.is_empty());
}

#[test]
fn test_cli_prints_matches() {
    let dir = tempdir().unwrap();
    let base = fs::canonicalize(dir.path()).unwrap();
    let target = base.join("target");
    fs::write(&target, b"").unwrap();
    let root = base.join("root");
    fs::create_dir_all(root.join("sub")).unwrap();
    symlink(&target, root.join("a")).unwrap();
    symlink("../../target", root.join("sub/b")).unwrap();

    let (stdout, _, code) = run_cli(&[target.to_str().unwrap(), root.to_str().unwrap()]);

    assert_eq!(code, Some(0));
    let mut lines: Vec<&str> = stdout.lines().collect();
    lines.sort();
    let a = root.join("a");
    let b = root.join("sub/b");
    assert_eq!(lines, vec![a.to_str().unwrap(), b.to_str().unwrap()]);
}

#[test]
fn test_cli_relative_arguments() {
    let dir = tempdir().unwrap();
    let base = fs::canonicalize(dir.path()).unwrap();
    fs::write(base.join("target"), b"").unwrap();
    fs::create_dir(base.join("root")).unwrap();
    symlink("../target", base.join("root/link")).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_symlink-walker"))
        .args(["target", "root"])
        .current_dir(&base)
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let expected = base.join("root/link");
    assert_eq!(stdout.trim_end(), expected.to_str().unwrap());
}

#[test]
fn test_cli_no_matches_is_success() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target");
    fs::write(&target, b"").unwrap();
    let root = dir.path().join("root");
    fs::create_dir(&root).unwrap();

    let (stdout, _, code) = run_cli(&[target.to_str().unwrap(), root.to_str().unwrap()]);

    assert_eq!(code, Some(0));
    assert!(stdout.is_empty());
}
