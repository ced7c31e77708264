//! Integration tests for the fill-docker-template binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli_in(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fill-docker-template").expect("Failed to locate binary");
    cmd.current_dir(dir);
    cmd
}

#[test]
fn test_relative_path_fills_sibling_dockerfile() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("ubuntu22")).unwrap();
    fs::write(
        tmp.path().join("ubuntu22/Dockerfile.template"),
        "FROM ubuntu:22.04\n@@GET_CHAPEL",
    )
    .unwrap();

    cli_in(tmp.path())
        .arg("ubuntu22/Dockerfile.template")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let output = fs::read_to_string(tmp.path().join("ubuntu22/Dockerfile")).unwrap();
    assert!(output.starts_with("FROM ubuntu:22.04\n\nCOPY --chown=user ./tarballs/"));
}

#[test]
fn test_undefined_placeholder_fails_with_report() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("t.template"), "FROM x\n@@INSTAL\n").unwrap();

    cli_in(tmp.path())
        .arg("t.template")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("undefined placeholder 'INSTAL'"))
        .stderr(predicate::str::contains("INSTALL"));

    assert!(!tmp.path().join("Dockerfile").exists());
}

#[test]
fn test_missing_template_fails() {
    let tmp = TempDir::new().unwrap();

    cli_in(tmp.path())
        .arg("missing.template")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to read template"));
}

#[test]
fn test_check_prints_placeholders() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("t.template"), "@@INSTALL @@ARGUMENTS @@INSTALL").unwrap();

    cli_in(tmp.path())
        .args(["--check", "t.template"])
        .assert()
        .success()
        .stdout("INSTALL\nARGUMENTS\n");

    assert!(!tmp.path().join("Dockerfile").exists());
}

#[test]
fn test_custom_table_flag() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("table.toml"),
        "[substitutions]\nBASE = \"FROM debian:12\"\n",
    )
    .unwrap();
    fs::write(tmp.path().join("t.template"), "@@BASE\n").unwrap();

    cli_in(tmp.path())
        .args(["-t", "table.toml", "t.template"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(tmp.path().join("Dockerfile")).unwrap(),
        "FROM debian:12\n"
    );
}

#[test]
fn test_bad_table_fails() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("table.toml"), "not toml {{").unwrap();
    fs::write(tmp.path().join("t.template"), "FROM x\n").unwrap();

    cli_in(tmp.path())
        .args(["--table", "table.toml", "t.template"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error loading substitution table"));
}

#[test]
fn test_missing_argument_is_usage_error() {
    let tmp = TempDir::new().unwrap();
    cli_in(tmp.path()).assert().failure();
}

#[test]
fn test_malformed_delimiter_fails_with_position() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("t.template"), "FROM x\n  @@{OPEN\n").unwrap();

    cli_in(tmp.path())
        .arg("t.template")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("line 2, column 3"));

    assert!(!tmp.path().join("Dockerfile").exists());
}
