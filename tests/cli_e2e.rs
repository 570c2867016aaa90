//! End-to-end CLI tests for the rawfetch binary.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use support::{Reply, TestServer, ok, probe, response};
use tempfile::TempDir;

/// Test that the binary without arguments prints usage and exits with code 0.
#[test]
fn test_binary_without_arguments_prints_usage() {
    let mut cmd = Command::cargo_bin("rawfetch").unwrap();
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

/// Test that a URL without an output path also prints usage.
#[test]
fn test_binary_with_only_url_prints_usage() {
    let mut cmd = Command::cargo_bin("rawfetch").unwrap();
    cmd.arg("http://127.0.0.1/file.bin")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("rawfetch").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Download one file over plain HTTP/1.1"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("rawfetch").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("rawfetch"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let mut cmd = Command::cargo_bin("rawfetch").unwrap();
    cmd.arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_unsupported_scheme_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.bin");

    let mut cmd = Command::cargo_bin("rawfetch").unwrap();
    cmd.arg("https://example.com/file.bin")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"))
        .stderr(predicate::str::contains("https"));
    assert!(!output.exists(), "no output file for a rejected URL");
}

#[test]
fn test_binary_malformed_url_fails() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out.bin");

    let mut cmd = Command::cargo_bin("rawfetch").unwrap();
    cmd.arg("not a url")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a url"));
}

#[test]
fn test_binary_downloads_file() {
    let server = TestServer::start(|request| match request.method.as_str() {
        "HEAD" => Reply::Send(probe(13, false)),
        _ => Reply::Send(ok(b"hello, world\n")),
    });
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("hello.txt");

    let mut cmd = Command::cargo_bin("rawfetch").unwrap();
    cmd.arg(server.url("/hello.txt"))
        .arg(&output)
        .arg("-q")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("OK 13 bytes"));

    assert_eq!(std::fs::read(&output).unwrap(), b"hello, world\n");
}

#[test]
fn test_binary_http_error_exits_non_zero() {
    let server = TestServer::start(|_| {
        Reply::Send(response(
            "404 Not Found",
            &["Content-Length: 0".to_string()],
            b"",
        ))
    });
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("missing.bin");

    let mut cmd = Command::cargo_bin("rawfetch").unwrap();
    cmd.arg(server.url("/missing.bin"))
        .arg(&output)
        .args(["-q", "--retry-delay-ms", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"));
}

#[test]
fn test_binary_max_attempts_out_of_range_rejected() {
    let mut cmd = Command::cargo_bin("rawfetch").unwrap();
    cmd.args(["-r", "0", "http://127.0.0.1/x", "out.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}
