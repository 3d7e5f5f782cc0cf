//! Types for the build run.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::entry_point::EntryPointError;
use crate::freeze::FreezeError;
use crate::manifest::{ManifestError, ProjectManifest};
use crate::merge::MergeError;
use crate::options::OptionsError;
use crate::script::ScriptError;

/// Inputs for one build run.
#[derive(Debug, Clone)]
pub struct BuildRequest {
  /// The loaded project manifest.
  pub manifest: ProjectManifest,

  /// Build base directory; work and output directories live under it.
  pub build_base: PathBuf,

  /// Interpreter version used in the output directory name.
  pub python_version: String,

  /// Whether to run automatic dependency discovery.
  pub discovery: bool,
}

/// A non-fatal condition the run completed in spite of.
///
/// Warnings are aggregated into the [`BuildReport`] so a degraded result
/// stays visible to the caller instead of scrolling past in a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
  /// Dependency discovery could not run; the build used declared options
  /// only.
  DiscoveryUnavailable { message: String },

  /// A discovered module file could not be matched to a module name and
  /// may be missing from the bundle.
  UnresolvableModule { file: PathBuf },

  /// A file already existed at the destination during merge and was left
  /// untouched.
  MergeConflict { file: PathBuf },
}

impl fmt::Display for Warning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Warning::DiscoveryUnavailable { message } => {
        write!(f, "dependency discovery unavailable: {}", message)
      }
      Warning::UnresolvableModule { file } => {
        write!(f, "unable to name module file: {}", file.display())
      }
      Warning::MergeConflict { file } => {
        write!(f, "kept existing file during merge: {}", file.display())
      }
    }
  }
}

/// Result of a completed build run.
#[derive(Debug, Clone)]
pub struct BuildReport {
  /// The consolidated distribution directory.
  pub dist_dir: PathBuf,

  /// Resolved names of the frozen executables, in freeze order.
  pub executables: Vec<String>,

  /// Files moved while consolidating output trees.
  pub files_merged: usize,

  /// Non-fatal conditions encountered during the run.
  pub warnings: Vec<Warning>,
}

impl BuildReport {
  /// True when the run completed without any warning.
  pub fn is_clean(&self) -> bool {
    self.warnings.is_empty()
  }

  /// The merge conflicts among the warnings.
  pub fn conflicts(&self) -> impl Iterator<Item = &PathBuf> {
    self.warnings.iter().filter_map(|warning| match warning {
      Warning::MergeConflict { file } => Some(file),
      _ => None,
    })
  }
}

/// Errors that abort a build run.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The manifest could not be loaded.
  #[error(transparent)]
  Manifest(#[from] ManifestError),

  /// An entry point declaration could not be parsed.
  #[error(transparent)]
  EntryPoint(#[from] EntryPointError),

  /// Nothing to build: no entry points and no declared scripts.
  #[error("no entry points or scripts declared")]
  NoExecutables,

  /// Two executables resolved to the same name.
  #[error("duplicate executable name '{name}'")]
  DuplicateName { name: String },

  /// A declared script does not exist.
  #[error("declared script not found: {0}")]
  ScriptNotFound(PathBuf),

  /// Launcher synthesis failed.
  #[error(transparent)]
  Script(#[from] ScriptError),

  /// Option validation failed after merging.
  #[error(transparent)]
  Options(#[from] OptionsError),

  /// The freezing engine failed for one executable.
  #[error("freeze failed for '{name}': {source}")]
  Freeze {
    name: String,
    #[source]
    source: FreezeError,
  },

  /// Consolidating output trees failed.
  #[error(transparent)]
  Merge(#[from] MergeError),

  /// A filesystem operation failed.
  #[error("build io error: {0}")]
  Io(#[from] std::io::Error),
}
