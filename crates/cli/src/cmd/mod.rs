mod build;
mod clean;
mod discover;
mod info;

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use discover::cmd_discover;
pub use info::cmd_info;

use std::path::{Path, PathBuf};

use permafrost_lib::consts::BUILD_BASE;
use permafrost_lib::manifest::ProjectManifest;

/// Resolve the build base directory for a manifest.
///
/// A relative `[build] base_dir` is anchored at the manifest's directory,
/// as is the default `build`.
pub(crate) fn resolve_build_base(manifest_path: &Path, manifest: &ProjectManifest) -> PathBuf {
  let root = manifest_path.parent().unwrap_or(Path::new("."));
  match &manifest.build.base_dir {
    Some(base) if base.is_absolute() => base.clone(),
    Some(base) => root.join(base),
    None => root.join(BUILD_BASE),
  }
}
