//! Freeze option resolution.
//!
//! Options reach an executable from three layers, lowest precedence first:
//! run-wide defaults, auto-discovered options, and explicit per-executable
//! overrides. List-valued options are ordered sets: merging appends entries
//! not already present, preserving first-seen order, and never clobbers
//! what an earlier layer declared. Scalar options are replaced outright by
//! the higher-precedence layer.
//!
//! Search-path entries are absolutized on insertion, so the "every `pathex`
//! entry is absolute" invariant holds by construction; [`FreezeOptions::validate`]
//! re-checks it and rejects an empty search path before any freeze begins.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::util::paths::absolutize;

/// Options handed to the freezing engine for one executable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreezeOptions {
  /// Resolved executable name. Scalar: highest precedence wins.
  pub name: Option<String>,

  /// Directory the build specification is written to.
  pub specpath: Option<PathBuf>,

  /// Additional module search paths. Ordered set of absolute paths.
  pub pathex: Vec<PathBuf>,

  /// Modules the engine's static import scanner would miss.
  pub hiddenimports: Vec<String>,

  /// Native binaries to bundle, as `source:dest` entries.
  pub binaries: Vec<String>,

  /// Data files to bundle, as `source:dest` entries.
  pub datas: Vec<String>,
}

/// Errors from option validation.
#[derive(Debug, Error)]
pub enum OptionsError {
  /// No search paths survived the merge; the engine would have nowhere to
  /// resolve libraries from.
  #[error("no module search paths resolved; declare pathex or enable discovery")]
  NoSearchPaths,

  /// A search path entry is not absolute.
  #[error("search path is not absolute: {0}")]
  RelativeSearchPath(PathBuf),
}

impl FreezeOptions {
  /// Append a search path if not already present, absolutizing it first.
  pub fn push_search_path(&mut self, path: impl AsRef<Path>) {
    let path = absolutize(path.as_ref());
    if !self.pathex.contains(&path) {
      self.pathex.push(path);
    }
  }

  /// Append a hidden import if not already present.
  pub fn push_hidden_import(&mut self, module: impl Into<String>) {
    let module = module.into();
    if !self.hiddenimports.contains(&module) {
      self.hiddenimports.push(module);
    }
  }

  /// Append a binary entry if not already present.
  pub fn push_binary(&mut self, entry: impl Into<String>) {
    let entry = entry.into();
    if !self.binaries.contains(&entry) {
      self.binaries.push(entry);
    }
  }

  /// Append a data entry if not already present.
  pub fn push_data(&mut self, entry: impl Into<String>) {
    let entry = entry.into();
    if !self.datas.contains(&entry) {
      self.datas.push(entry);
    }
  }

  /// Merge a higher-precedence layer into this one.
  ///
  /// Lists union (append-missing, first-seen order kept); scalars present in
  /// `other` replace the current value.
  pub fn merge_from(&mut self, other: &FreezeOptions) {
    if other.name.is_some() {
      self.name = other.name.clone();
    }
    if other.specpath.is_some() {
      self.specpath = other.specpath.clone();
    }
    for path in &other.pathex {
      self.push_search_path(path);
    }
    for module in &other.hiddenimports {
      self.push_hidden_import(module.clone());
    }
    for entry in &other.binaries {
      self.push_binary(entry.clone());
    }
    for entry in &other.datas {
      self.push_data(entry.clone());
    }
  }

  /// Resolve a full option set from layers in ascending precedence.
  pub fn merged<'a>(layers: impl IntoIterator<Item = &'a FreezeOptions>) -> FreezeOptions {
    let mut resolved = FreezeOptions::default();
    for layer in layers {
      resolved.merge_from(layer);
    }
    resolved
  }

  /// Check the post-merge invariants.
  pub fn validate(&self) -> Result<(), OptionsError> {
    if self.pathex.is_empty() {
      return Err(OptionsError::NoSearchPaths);
    }
    for path in &self.pathex {
      if !path.is_absolute() {
        return Err(OptionsError::RelativeSearchPath(path.clone()));
      }
    }
    Ok(())
  }
}
