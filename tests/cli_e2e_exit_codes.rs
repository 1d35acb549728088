//! End-to-end tests for CLI exit codes.
//!
//! - Exit code 0: Success
//! - Exit code 1: Any error, including accumulated merge errors
//! - Exit code 2: Invalid command-line usage (handled by clap)

mod common;

use common::prelude::*;

/// Exit code 0 is returned for a successful merge.
#[test]
fn test_exit_code_success() {
    let fixture =
        TestFixture::new().with_state("a.tfstate", &state(&[resource("", "null_resource", "a")]));

    fixture.command().args(["merge", "a.tfstate"]).assert().code(0);
}

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    let mut cmd = cargo_bin_cmd!("tfmerge");

    cmd.arg("--help").assert().code(0);
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    let mut cmd = cargo_bin_cmd!("tfmerge");

    cmd.arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("tfmerge "));
}

/// Exit code 1 is returned when an input file does not exist.
#[test]
fn test_exit_code_missing_state_file() {
    let fixture = TestFixture::new();

    fixture
        .command()
        .args(["merge", "missing.tfstate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read state file missing.tfstate"));
}

/// Exit code 1 is returned for a state file that is not valid JSON.
#[test]
fn test_exit_code_invalid_state_json() {
    let fixture = TestFixture::new().with_state("broken.tfstate", "{\"version\": 4,");

    fixture
        .command()
        .args(["merge", "broken.tfstate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse state document"));
}

/// Exit code 1 is returned for a malformed base state.
#[test]
fn test_exit_code_invalid_base_state() {
    let fixture = TestFixture::new()
        .with_state("a.tfstate", &state(&[]))
        .with_state("base.tfstate", "not json");

    fixture
        .command()
        .args(["merge", "--base", "base.tfstate", "a.tfstate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("base state"));
}

/// Exit code 1 is returned for an invalid configuration file.
#[test]
fn test_exit_code_invalid_config() {
    let fixture = TestFixture::new()
        .with_state("a.tfstate", &state(&[]))
        .with_config("resolve: skip\n");

    fixture
        .command()
        .args(["merge", "a.tfstate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to load config"));
}

/// Exit code 1 is returned when the terraform normalizer cannot run.
#[test]
fn test_exit_code_terraform_normalizer_unavailable() {
    let fixture = TestFixture::new().with_state("a.tfstate", &state(&[]));

    fixture
        .command()
        .args([
            "merge",
            "--normalizer",
            "terraform",
            "--terraform",
            "/nonexistent/terraform",
            "a.tfstate",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Terraform command failed"));
}

/// Exit code 2 is returned for an unknown resolution policy.
#[test]
fn test_exit_code_invalid_resolution() {
    let fixture = TestFixture::new().with_state("a.tfstate", &state(&[]));

    fixture
        .command()
        .args(["merge", "--resolution", "newest", "a.tfstate"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("newest"));
}

/// Exit code 2 is returned when no input files are given.
#[test]
fn test_exit_code_missing_files() {
    let mut cmd = cargo_bin_cmd!("tfmerge");

    cmd.arg("merge").assert().code(2);
}

/// Exit code 2 is returned for an unknown subcommand.
#[test]
fn test_exit_code_unknown_subcommand() {
    let mut cmd = cargo_bin_cmd!("tfmerge");

    cmd.arg("split").assert().code(2);
}
