//! Smoke tests for the waffle binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn waffle(data_dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("waffle").unwrap();
    cmd.arg("--data-dir").arg(data_dir).env("RUST_LOG", "warn");
    cmd
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("waffle")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("history"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn status_before_init() {
    let dir = tempdir().unwrap();
    waffle(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("NOT INITIALIZED"));
}

#[test]
fn init_then_status_shows_actor() {
    let dir = tempdir().unwrap();
    waffle(dir.path())
        .args(["--server", "http://relay.test:3000", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Actor ID:"));

    waffle(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://relay.test:3000/sse"));
}

#[test]
fn send_before_init_fails() {
    let dir = tempdir().unwrap();
    waffle(dir.path())
        .args(["--mock", "send", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("waffle init"));
}

#[test]
fn mock_session_commands() {
    let dir = tempdir().unwrap();
    waffle(dir.path()).arg("init").assert().success();

    waffle(dir.path())
        .args(["--mock", "history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("waffle-bot: Welcome to Waffle!"));

    waffle(dir.path())
        .args(["--mock", "send", "hi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sent successfully!"));

    waffle(dir.path())
        .args(["--mock", "watch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("syrup: Hello from the stream."));
}
