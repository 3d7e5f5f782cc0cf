//! Implementation of the `frost build` command.
//!
//! Loads the project manifest, freezes every declared entry point and
//! script, and consolidates the output trees into one distribution
//! directory. Warnings (discovery degradation, merge conflicts) are
//! printed but do not fail the command; configuration and engine errors
//! do.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use permafrost_lib::build::{BuildRequest, run_build};
use permafrost_lib::freeze::pyinstaller::PyInstallerFreezer;
use permafrost_lib::manifest::load_manifest;
use permafrost_lib::metadata::pip::PipMetadata;
use permafrost_lib::modules::python::{PythonModuleFinder, interpreter_version};

use crate::output::{format_duration, print_stat, print_success, print_warning};

/// Execute the build command.
pub fn cmd_build(manifest_path: &Path, discovery: bool, python: &str) -> Result<()> {
  let started = Instant::now();
  let manifest = load_manifest(manifest_path).context("Failed to load manifest")?;
  let build_base = super::resolve_build_base(manifest_path, &manifest);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

  // The output directory name needs the interpreter version; prefer the
  // pinned one, otherwise ask the interpreter itself.
  let python_version = match manifest.build.python_version.clone() {
    Some(version) => version,
    None => match rt.block_on(interpreter_version(python)) {
      Ok(version) => version,
      Err(err) => {
        print_warning(&format!(
          "could not detect interpreter version ({}); using '3'",
          err
        ));
        "3".to_string()
      }
    },
  };
  debug!(python_version, "resolved interpreter version");

  let request = BuildRequest {
    manifest,
    build_base,
    python_version,
    discovery,
  };

  let provider = PipMetadata::default();
  let finder = PythonModuleFinder::with_interpreter(python);
  let freezer = PyInstallerFreezer::default();

  let report = rt
    .block_on(run_build(&request, &provider, &finder, &freezer))
    .context("Build failed")?;

  println!();
  for warning in &report.warnings {
    print_warning(&warning.to_string());
  }

  print_success(&format!(
    "Froze {} executable(s) in {}",
    report.executables.len(),
    format_duration(started.elapsed())
  ));
  print_stat("Executables", &report.executables.join(", "));
  print_stat("Files merged", &report.files_merged.to_string());
  print_stat("Distribution", &report.dist_dir.display().to_string());
  if !report.is_clean() {
    print_warning(&format!(
      "completed with {} warning(s); output may be degraded",
      report.warnings.len()
    ));
  }

  Ok(())
}
