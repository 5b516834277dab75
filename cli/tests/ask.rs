//! # ASIA CLI Ask Integration Tests
//!
//! File: cli/tests/ask.rs
//!
//! ## Overview
//!
//! Runs `asia ask` end to end. Every upstream points at a refused address
//! (see `common::write_unreachable_config`), so only local answers and the
//! fallback can be produced.
//!

mod common;
use common::*;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_ask_arithmetic() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = write_unreachable_config(dir.path());
    asia_cmd()
        .arg("--config")
        .arg(&config)
        .args(["ask", "2", "+", "2"])
        .assert()
        .success()
        .stdout(predicate::str::diff("The answer is 4\n"));
}

#[test]
fn test_ask_identity() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = write_unreachable_config(dir.path());
    asia_cmd()
        .arg("--config")
        .arg(&config)
        .args(["ask", "what", "is", "your", "name"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A.S.I.A"));
}

#[test]
fn test_ask_falls_back_when_offline() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = write_unreachable_config(dir.path());
    asia_cmd()
        .arg("--config")
        .arg(&config)
        .args(["ask", "history of the printing press"])
        .assert()
        .success()
        .stdout(predicate::str::contains("couldn't find a solid answer"));
}

#[test]
fn test_ask_requires_a_question() {
    asia_cmd().arg("ask").assert().failure();
}
