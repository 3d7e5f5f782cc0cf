//! Package metadata scanning.
//!
//! The package index is an external collaborator reached through the
//! [`MetadataProvider`] trait: one snapshot query for the installed-package
//! universe and its dependency edges, plus a per-package file listing.
//! This module classifies the listed files into interpretable modules and
//! native binaries by suffix; anything else is ignored.
//!
//! Scanning fails soft: a package the provider has no record for, or a
//! record without a file manifest, yields empty sets rather than an error.

pub mod pip;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, trace};

use crate::consts::{BINARY_SUFFIXES, MODULE_SUFFIXES};
use crate::util::paths::absolutize;
use crate::util::process::ProcessError;

/// One installed package and its direct dependency edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
  /// Case-normalized package key.
  pub key: String,

  /// Keys of directly required packages.
  pub dependencies: Vec<String>,
}

/// Location and owned files of one installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
  /// Installation root the file entries are relative to.
  pub location: PathBuf,

  /// Files owned by the package, relative to `location`. `None` when the
  /// package was installed without a file manifest.
  pub files: Option<Vec<PathBuf>>,
}

/// Errors from querying the package index.
#[derive(Debug, Error)]
pub enum MetadataError {
  /// The provider tool failed to run or exited with an error.
  #[error(transparent)]
  Tool(#[from] ProcessError),

  /// The provider produced output this crate cannot interpret.
  #[error("unexpected {tool} output: {message}")]
  Parse { tool: &'static str, message: String },
}

/// External package index.
pub trait MetadataProvider {
  /// Every installed package with its direct dependency edges, in one
  /// snapshot query.
  fn installed_packages(&self) -> impl Future<Output = Result<Vec<PackageRecord>, MetadataError>>;

  /// Location and file listing for one package, or `None` when the
  /// provider has no record of it.
  fn show_package(
    &self,
    key: &str,
  ) -> impl Future<Output = Result<Option<PackageInfo>, MetadataError>>;
}

/// Files owned by a package closure, classified by suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredFiles {
  /// Absolute paths of interpretable module files.
  pub module_files: BTreeSet<PathBuf>,

  /// Absolute paths of native shared objects.
  pub binary_files: BTreeSet<PathBuf>,
}

impl DiscoveredFiles {
  pub fn is_empty(&self) -> bool {
    self.module_files.is_empty() && self.binary_files.is_empty()
  }

  /// Fold another classification result into this one. Duplicate paths
  /// collapse through the set semantics.
  pub fn extend(&mut self, other: DiscoveredFiles) {
    self.module_files.extend(other.module_files);
    self.binary_files.extend(other.binary_files);
  }
}

/// True when the file name carries a native shared-object suffix.
pub fn is_binary_file(path: &Path) -> bool {
  has_suffix(path, BINARY_SUFFIXES)
}

/// True when the file name carries a module suffix.
pub fn is_module_file(path: &Path) -> bool {
  has_suffix(path, MODULE_SUFFIXES)
}

fn has_suffix(path: &Path, suffixes: &[&str]) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| suffixes.contains(&ext))
    .unwrap_or(false)
}

/// Normalize a package key the way the index does: lowercase, underscores
/// folded to hyphens.
pub fn normalize_key(key: &str) -> String {
  key.trim().to_ascii_lowercase().replace('_', "-")
}

/// Classify the files owned by one package.
///
/// Packages the provider cannot introspect yield empty sets.
pub async fn files_owned_by<P: MetadataProvider>(
  provider: &P,
  key: &str,
) -> Result<DiscoveredFiles, MetadataError> {
  let info = match provider.show_package(key).await? {
    Some(info) => info,
    None => {
      debug!(package = key, "no metadata record, skipping");
      return Ok(DiscoveredFiles::default());
    }
  };

  let files = match info.files {
    Some(files) => files,
    None => {
      debug!(package = key, "no file manifest, skipping");
      return Ok(DiscoveredFiles::default());
    }
  };

  let mut discovered = DiscoveredFiles::default();
  for relative in files {
    let full = absolutize(&info.location.join(&relative));
    if is_module_file(&relative) {
      discovered.module_files.insert(full);
    } else if is_binary_file(&relative) {
      discovered.binary_files.insert(full);
    } else {
      trace!(file = %relative.display(), "ignoring unclassified file");
    }
  }

  debug!(
    package = key,
    modules = discovered.module_files.len(),
    binaries = discovered.binary_files.len(),
    "package files classified"
  );

  Ok(discovered)
}
