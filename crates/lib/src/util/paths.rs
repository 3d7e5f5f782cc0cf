//! Path normalization helpers.

use std::path::{Path, PathBuf};

/// Return an absolute form of `path`.
///
/// Existing paths are canonicalized (via `dunce`, so Windows results stay in
/// legacy form). Paths that do not exist yet are anchored at the current
/// working directory without touching the filesystem.
pub fn absolutize(path: &Path) -> PathBuf {
  if let Ok(canonical) = dunce::canonicalize(path) {
    return canonical;
  }
  if path.is_absolute() {
    return path.to_path_buf();
  }
  match std::env::current_dir() {
    Ok(cwd) => cwd.join(path),
    Err(_) => path.to_path_buf(),
  }
}
