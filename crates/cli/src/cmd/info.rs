//! Implementation of the `frost info` command.

use std::path::Path;

use anyhow::{Context, Result};

use permafrost_lib::manifest::load_manifest;
use permafrost_lib::platform::output_dir_name;

use crate::output::{print_info, print_stat};

/// Execute the info command: show the manifest and resolved directories.
pub fn cmd_info(manifest_path: &Path) -> Result<()> {
  let manifest = load_manifest(manifest_path).context("Failed to load manifest")?;
  let build_base = super::resolve_build_base(manifest_path, &manifest);
  let entry_points = manifest.entry_points().context("Invalid entry point")?;

  print_info(&format!("frost v{}", env!("CARGO_PKG_VERSION")));
  println!();
  print_stat("Project", &manifest.project.name);
  print_stat("Packages", &manifest.project.packages.join(", "));
  print_stat("Requires", &manifest.project.requires.join(", "));
  print_stat("Build base", &build_base.display().to_string());

  let version = manifest.build.python_version.as_deref().unwrap_or("3");
  print_stat(
    "Output dir",
    &build_base.join(output_dir_name(version)).display().to_string(),
  );

  println!();
  print_info(&format!("Entry points ({})", entry_points.len()));
  for entry_point in &entry_points {
    print_stat(&entry_point.name, &format!(
      "{}:{}",
      entry_point.module_name,
      entry_point.attr_path()
    ));
  }
  for script in &manifest.project.scripts {
    print_stat("script", &script.display().to_string());
  }

  Ok(())
}
