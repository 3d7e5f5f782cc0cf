//! Project manifest loading.

mod types;

use std::path::Path;

use thiserror::Error;
use tracing::debug;

pub use types::{BuildSection, ProjectManifest, ProjectSection, requirement_key};

/// Errors from locating or parsing a project manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// The manifest file does not exist.
  #[error("manifest not found: {0}")]
  NotFound(std::path::PathBuf),

  /// The manifest could not be read.
  #[error("failed to read manifest {path}: {source}")]
  Read {
    path: std::path::PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The manifest is not valid TOML for the expected shape.
  #[error("failed to parse manifest {path}: {source}")]
  Parse {
    path: std::path::PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

/// Load a project manifest from `path`.
pub fn load_manifest(path: &Path) -> Result<ProjectManifest, ManifestError> {
  if !path.exists() {
    return Err(ManifestError::NotFound(path.to_path_buf()));
  }

  let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
    path: path.to_path_buf(),
    source,
  })?;

  let manifest: ProjectManifest = toml::from_str(&text).map_err(|source| ManifestError::Parse {
    path: path.to_path_buf(),
    source,
  })?;

  debug!(
    name = %manifest.project.name,
    entry_points = manifest.project.entry_points.len(),
    scripts = manifest.project.scripts.len(),
    "manifest loaded"
  );

  Ok(manifest)
}
