//! CLI smoke tests for frost.
//!
//! These tests verify that the CLI commands run without panicking and
//! return appropriate exit codes. Commands that would drive the real
//! freezing engine are only exercised up to their configuration checks.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a Command for the frost binary.
fn frost_cmd() -> Command {
  cargo_bin_cmd!("frost")
}

/// Create a temp directory with a manifest file.
fn temp_manifest(content: &str) -> TempDir {
  let temp = TempDir::new().unwrap();
  std::fs::write(temp.path().join("permafrost.toml"), content).unwrap();
  temp
}

const MINIMAL_MANIFEST: &str = r#"
[project]
name = "demo"
packages = ["pkg"]
entry_points = ["cli_a = pkg.a:main"]
"#;

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  frost_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  frost_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("frost"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["build", "discover", "clean", "info"] {
    frost_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// Info
// =============================================================================

#[test]
fn info_shows_the_manifest() {
  let temp = temp_manifest(MINIMAL_MANIFEST);
  frost_cmd()
    .current_dir(temp.path())
    .arg("info")
    .assert()
    .success()
    .stdout(predicate::str::contains("demo"))
    .stdout(predicate::str::contains("cli_a"));
}

#[test]
fn info_fails_without_a_manifest() {
  let temp = TempDir::new().unwrap();
  frost_cmd()
    .current_dir(temp.path())
    .arg("info")
    .assert()
    .failure()
    .stderr(predicate::str::contains("manifest"));
}

#[test]
fn info_rejects_a_malformed_manifest() {
  let temp = temp_manifest("[project\nname =");
  frost_cmd()
    .current_dir(temp.path())
    .arg("info")
    .assert()
    .failure();
}

#[test]
fn info_rejects_invalid_entry_points() {
  let temp = temp_manifest(
    r#"
[project]
name = "demo"
entry_points = ["not-a-declaration"]
"#,
  );
  frost_cmd()
    .current_dir(temp.path())
    .arg("info")
    .assert()
    .failure()
    .stderr(predicate::str::contains("entry point"));
}

// =============================================================================
// Clean
// =============================================================================

#[test]
fn clean_without_build_dir_is_a_no_op() {
  let temp = temp_manifest(MINIMAL_MANIFEST);
  frost_cmd()
    .current_dir(temp.path())
    .arg("clean")
    .assert()
    .success()
    .stdout(predicate::str::contains("Nothing to clean"));
}

#[test]
fn clean_removes_the_build_base() {
  let temp = temp_manifest(MINIMAL_MANIFEST);
  std::fs::create_dir_all(temp.path().join("build/frost-work")).unwrap();

  frost_cmd()
    .current_dir(temp.path())
    .arg("clean")
    .assert()
    .success();

  assert!(!temp.path().join("build").exists());
}

// =============================================================================
// Build
// =============================================================================

#[test]
fn build_fails_without_a_manifest() {
  let temp = TempDir::new().unwrap();
  frost_cmd()
    .current_dir(temp.path())
    .arg("build")
    .assert()
    .failure()
    .stderr(predicate::str::contains("manifest"));
}

#[test]
fn build_fails_with_nothing_to_freeze() {
  let temp = temp_manifest(
    r#"
[project]
name = "empty"
"#,
  );
  frost_cmd()
    .current_dir(temp.path())
    .arg("build")
    .arg("--no-discovery")
    .assert()
    .failure()
    .stderr(predicate::str::contains("no entry points"));
}
