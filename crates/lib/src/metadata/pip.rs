//! pip-backed metadata provider.
//!
//! The installed-package universe comes from `pipdeptree --json`; per-package
//! locations and file listings come from `pip show -f`. Both tools report on
//! whatever environment they are invoked in, so the provider inherits the
//! caller's environment unchanged.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use super::{MetadataError, MetadataProvider, PackageInfo, PackageRecord, normalize_key};
use crate::util::process::{ProcessError, run_capture};

/// Provider shelling out to `pip` and `pipdeptree`.
#[derive(Debug, Clone)]
pub struct PipMetadata {
  pip: String,
  pipdeptree: String,
}

impl Default for PipMetadata {
  fn default() -> Self {
    Self {
      pip: "pip".to_string(),
      pipdeptree: "pipdeptree".to_string(),
    }
  }
}

impl PipMetadata {
  /// Use explicit tool names (e.g. `pip3`, an absolute path, or a wrapper).
  pub fn with_tools(pip: impl Into<String>, pipdeptree: impl Into<String>) -> Self {
    Self {
      pip: pip.into(),
      pipdeptree: pipdeptree.into(),
    }
  }
}

impl MetadataProvider for PipMetadata {
  async fn installed_packages(&self) -> Result<Vec<PackageRecord>, MetadataError> {
    let raw = run_capture(&self.pipdeptree, ["--json"]).await?;
    parse_dep_tree(&raw)
  }

  async fn show_package(&self, key: &str) -> Result<Option<PackageInfo>, MetadataError> {
    match run_capture(&self.pip, ["show", "-f", key]).await {
      Ok(raw) => Ok(parse_show_output(&raw)),
      // pip exits nonzero for unknown packages; that is "no record", not a
      // failure of the provider itself.
      Err(ProcessError::Failed { code, .. }) => {
        debug!(package = key, code = ?code, "pip has no record");
        Ok(None)
      }
      Err(err) => Err(err.into()),
    }
  }
}

#[derive(Debug, Deserialize)]
struct DepTreeEntry {
  package: DepTreePackage,
  #[serde(default)]
  dependencies: Vec<DepTreePackage>,
}

#[derive(Debug, Deserialize)]
struct DepTreePackage {
  key: String,
}

/// Parse `pipdeptree --json` output into package records.
pub fn parse_dep_tree(raw: &str) -> Result<Vec<PackageRecord>, MetadataError> {
  let entries: Vec<DepTreeEntry> =
    serde_json::from_str(raw).map_err(|err| MetadataError::Parse {
      tool: "pipdeptree",
      message: err.to_string(),
    })?;

  Ok(
    entries
      .into_iter()
      .map(|entry| PackageRecord {
        key: normalize_key(&entry.package.key),
        dependencies: entry
          .dependencies
          .into_iter()
          .map(|dep| normalize_key(&dep.key))
          .collect(),
      })
      .collect(),
  )
}

/// Parse `pip show -f` output.
///
/// The format is a header of `Key: value` lines followed by an optional
/// `Files:` section listing one relative path per indented line. A record
/// without a usable `Location:` is treated as absent; a record without a
/// `Files:` section keeps `files = None`.
pub fn parse_show_output(raw: &str) -> Option<PackageInfo> {
  let mut location: Option<PathBuf> = None;
  let mut files: Option<Vec<PathBuf>> = None;
  let mut in_files = false;

  for line in raw.lines() {
    if in_files {
      let entry = line.trim();
      if entry.is_empty() {
        continue;
      }
      if let Some(files) = files.as_mut() {
        files.push(PathBuf::from(entry));
      }
      continue;
    }

    if let Some(rest) = line.strip_prefix("Location:") {
      location = Some(PathBuf::from(rest.trim()));
    } else if line.trim_end() == "Files:" {
      in_files = true;
      files = Some(Vec::new());
    }
  }

  location.map(|location| PackageInfo { location, files })
}
