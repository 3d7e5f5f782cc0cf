//! Implementation of the `frost clean` command.

use std::path::Path;

use anyhow::{Context, Result};

use permafrost_lib::manifest::load_manifest;

use crate::output::{print_info, print_success};

/// Execute the clean command: remove the build base directory.
pub fn cmd_clean(manifest_path: &Path) -> Result<()> {
  let manifest = load_manifest(manifest_path).context("Failed to load manifest")?;
  let build_base = super::resolve_build_base(manifest_path, &manifest);

  if !build_base.exists() {
    print_info("Nothing to clean");
    return Ok(());
  }

  std::fs::remove_dir_all(&build_base)
    .with_context(|| format!("Failed to remove {}", build_base.display()))?;
  print_success(&format!("Removed {}", build_base.display()));
  Ok(())
}
