//! Implementation of the `frost discover` command.
//!
//! Runs dependency discovery on its own and prints the option fragment it
//! would contribute to a build. Useful for inspecting why a dependency is
//! (or is not) being bundled.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use permafrost_lib::discover::discover;
use permafrost_lib::manifest::load_manifest;
use permafrost_lib::metadata::pip::PipMetadata;
use permafrost_lib::modules::python::PythonModuleFinder;
use permafrost_lib::options::FreezeOptions;

use crate::output::{print_info, print_stat, print_warning};

#[derive(Serialize)]
struct Fragment<'a> {
  packages: &'a BTreeSet<String>,
  options: &'a FreezeOptions,
  unresolvable: &'a [PathBuf],
}

/// Execute the discover command.
pub fn cmd_discover(manifest_path: &Path, python: &str, json: bool) -> Result<()> {
  let manifest = load_manifest(manifest_path).context("Failed to load manifest")?;
  let seeds = manifest.requirement_keys();

  let provider = PipMetadata::default();
  let finder = PythonModuleFinder::with_interpreter(python);

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let discovery = rt
    .block_on(discover(&provider, &finder, &seeds))
    .context("Discovery failed")?;

  if json {
    let fragment = Fragment {
      packages: &discovery.packages,
      options: &discovery.options,
      unresolvable: &discovery.unresolvable,
    };
    println!("{}", serde_json::to_string_pretty(&fragment)?);
    return Ok(());
  }

  print_info(&format!("Package closure ({})", discovery.packages.len()));
  for package in &discovery.packages {
    print_stat("package", package);
  }

  print_info(&format!(
    "Hidden imports ({})",
    discovery.options.hiddenimports.len()
  ));
  for module in &discovery.options.hiddenimports {
    print_stat("import", module);
  }

  print_info(&format!("Search paths ({})", discovery.options.pathex.len()));
  for path in &discovery.options.pathex {
    print_stat("path", &path.display().to_string());
  }

  print_info(&format!("Binaries ({})", discovery.options.binaries.len()));
  for entry in &discovery.options.binaries {
    print_stat("binary", entry);
  }

  for file in &discovery.unresolvable {
    print_warning(&format!("unable to name module file: {}", file.display()));
  }

  Ok(())
}
