//! Project manifest types.
//!
//! The manifest (`permafrost.toml`) declares what gets frozen: the project's
//! packages, its install requirements, entry points, any extra standalone
//! scripts, run-wide freeze options, and per-executable overrides.
//!
//! ```toml
//! [project]
//! name = "acme-tools"
//! packages = ["acme"]
//! requires = ["requests", "click"]
//! entry_points = [
//!   "acme-cli = acme.cli:main",
//!   "acme-sync = acme.sync:run",
//! ]
//!
//! [options]
//! hiddenimports = ["pkg_resources"]
//!
//! [executables.acme-cli]
//! hiddenimports = ["acme.plugins.extra"]
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::entry_point::{EntryPoint, EntryPointError};
use crate::options::FreezeOptions;

/// The complete project manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectManifest {
  pub project: ProjectSection,

  pub build: BuildSection,

  /// Run-wide freeze options (lowest precedence layer).
  pub options: FreezeOptions,

  /// Per-executable overrides (highest precedence layer), keyed by
  /// executable name.
  pub executables: BTreeMap<String, FreezeOptions>,
}

/// The `[project]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
  pub name: String,

  /// Packages this project provides. Imported by every launcher so the
  /// engine's static scanner discovers them.
  pub packages: Vec<String>,

  /// Install requirements. Seeds for dependency discovery and additional
  /// hidden imports.
  pub requires: Vec<String>,

  /// Standalone scripts to freeze alongside entry-point launchers.
  pub scripts: Vec<PathBuf>,

  /// Entry point declarations in `name = module:attr` form.
  pub entry_points: Vec<String>,
}

/// The `[build]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
  /// Build base directory. Defaults to `build` next to the manifest.
  pub base_dir: Option<PathBuf>,

  /// Interpreter version used in the output directory name. Queried from
  /// the interpreter when unset.
  pub python_version: Option<String>,
}

impl ProjectManifest {
  /// Parse all declared entry points.
  pub fn entry_points(&self) -> Result<Vec<EntryPoint>, EntryPointError> {
    self
      .project
      .entry_points
      .iter()
      .map(|spec| EntryPoint::parse(spec))
      .collect()
  }

  /// Requirement keys declared in `[project] requires`, with any version
  /// constraints stripped.
  pub fn requirement_keys(&self) -> Vec<String> {
    self
      .project
      .requires
      .iter()
      .map(|req| requirement_key(req).to_string())
      .collect()
  }
}

/// The bare distribution key of a requirement declaration.
///
/// `requests>=2.31` -> `requests`, `foo[extra]` -> `foo`.
pub fn requirement_key(req: &str) -> &str {
  let end = req
    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'))
    .unwrap_or(req.len());
  req[..end].trim()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn requirement_key_strips_constraints() {
    assert_eq!(requirement_key("requests"), "requests");
    assert_eq!(requirement_key("requests>=2.31"), "requests");
    assert_eq!(requirement_key("foo[extra]"), "foo");
    assert_eq!(requirement_key("bar == 1.0"), "bar");
    assert_eq!(requirement_key("my-pkg~=0.4"), "my-pkg");
  }

  #[test]
  fn entry_points_parse_from_declarations() {
    let manifest = ProjectManifest {
      project: ProjectSection {
        entry_points: vec!["a = pkg.a:main".to_string(), "b = pkg.b:main".to_string()],
        ..Default::default()
      },
      ..Default::default()
    };

    let parsed = manifest.entry_points().unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].name, "a");
    assert_eq!(parsed[1].module_name, "pkg.b");
  }

  #[test]
  fn invalid_entry_point_surfaces_error() {
    let manifest = ProjectManifest {
      project: ProjectSection {
        entry_points: vec!["broken".to_string()],
        ..Default::default()
      },
      ..Default::default()
    };
    assert!(manifest.entry_points().is_err());
  }
}
