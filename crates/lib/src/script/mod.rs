//! Launcher script synthesis.
//!
//! Each entry point gets a minimal launcher: import the declared module,
//! invoke the attribute path as a zero-argument call, then import every
//! declared project package and requirement so the freezing engine's static
//! import scanner sees them even though the launcher body never uses them.
//!
//! After synthesis every script is uniquified: renamed with a short
//! content-derived digest so its basename can never collide with a real
//! importable module name (a collision makes imports inside the frozen
//! bundle ambiguous). The digest is deterministic, so repeated builds of
//! identical inputs produce identical script names.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::entry_point::EntryPoint;
use crate::manifest::requirement_key;
use crate::util::hash::short_digest;

/// Errors from launcher synthesis.
#[derive(Debug, Error)]
pub enum ScriptError {
  /// Two entry points resolved to the same script name.
  #[error("duplicate script name '{name}'; entry point names must be unique")]
  DuplicateScript { name: String },

  /// The launcher could not be written or renamed.
  #[error("failed to write launcher {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Write the launcher for one entry point into `work_dir`.
///
/// Returns the script path. A script already present at the target path is
/// a configuration error (two entry points sharing a name), never silently
/// overwritten.
pub fn synthesize(
  entry_point: &EntryPoint,
  packages: &[String],
  requires: &[String],
  work_dir: &Path,
) -> Result<PathBuf, ScriptError> {
  let path = work_dir.join(format!("{}.py", entry_point.name));
  if path.exists() {
    return Err(ScriptError::DuplicateScript {
      name: entry_point.name.clone(),
    });
  }

  let mut body = String::new();
  body.push_str(&format!("import {}\n", entry_point.module_name));
  body.push_str(&format!(
    "{}.{}()\n",
    entry_point.module_name,
    entry_point.attr_path()
  ));
  for package in packages {
    body.push_str(&format!("import {}\n", import_name(package)));
  }
  for requirement in requires {
    body.push_str(&format!("import {}\n", import_name(requirement)));
  }

  std::fs::write(&path, &body).map_err(|source| ScriptError::Io {
    path: path.clone(),
    source,
  })?;

  debug!(entry_point = %entry_point.name, path = %path.display(), "launcher written");
  Ok(path)
}

/// Rename a script so its basename is not a valid module name.
///
/// `cli_a.py` becomes `cli_a.py.<digest>.py`; the extra dotted components
/// make the stem unimportable while keeping the executable name derivable
/// from the original file name.
pub fn uniquify(script: &Path) -> Result<PathBuf, ScriptError> {
  let content = std::fs::read(script).map_err(|source| ScriptError::Io {
    path: script.to_path_buf(),
    source,
  })?;
  let digest = short_digest(&content);

  let file_name = script
    .file_name()
    .map(|name| name.to_string_lossy().to_string())
    .unwrap_or_default();
  let renamed = script.with_file_name(format!("{}.{}.py", file_name, digest));

  std::fs::rename(script, &renamed).map_err(|source| ScriptError::Io {
    path: script.to_path_buf(),
    source,
  })?;

  debug!(from = %script.display(), to = %renamed.display(), "launcher uniquified");
  Ok(renamed)
}

/// The executable name a script resolves to: its file name up to the first
/// `.py` component.
pub fn script_name(script: &Path) -> String {
  let file_name = script
    .file_name()
    .map(|name| name.to_string_lossy().to_string())
    .unwrap_or_default();
  file_name
    .split_once(".py")
    .map(|(stem, _)| stem.to_string())
    .unwrap_or(file_name)
}

/// Importable module name for a declared package or requirement.
pub fn import_name(declared: &str) -> String {
  requirement_key(declared).replace('-', "_")
}
