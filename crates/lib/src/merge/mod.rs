//! Output tree merging.
//!
//! After every executable is frozen into its own sibling output directory,
//! the trees are reduced pairwise into the first executable's tree, which
//! is then flattened into the distribution root itself. Merging is
//! conservative: a file already present at the destination is never
//! overwritten. The collision is recorded as a conflict and the source
//! file is left behind. Conflicts degrade the result; they do not abort it.
//!
//! All merges run sequentially in a deterministic order so conflict
//! reporting is reproducible.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Errors that stop a merge outright.
#[derive(Debug, Error)]
pub enum MergeError {
  /// The destination root does not exist; there is nothing to merge into.
  #[error("merge destination does not exist: {0}")]
  MissingDestination(PathBuf),

  /// Walking a tree failed.
  #[error("failed to walk {path}: {message}")]
  Walk { path: PathBuf, message: String },

  /// A filesystem operation failed.
  #[error("merge io error at {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Outcome of one or more merges.
#[derive(Debug, Default, Clone)]
pub struct MergeReport {
  /// Files moved into the destination.
  pub moved: usize,

  /// Relative paths that already existed at the destination and were left
  /// untouched.
  pub conflicts: Vec<PathBuf>,
}

impl MergeReport {
  /// True when no conflict occurred.
  pub fn is_clean(&self) -> bool {
    self.conflicts.is_empty()
  }

  /// Fold another report into this one.
  pub fn absorb(&mut self, other: MergeReport) {
    self.moved += other.moved;
    self.conflicts.extend(other.conflicts);
  }
}

/// Merge `source_root` into `dest_root`.
///
/// Directories are created as needed; files move unless the destination
/// already has one at the same relative path, which is recorded as a
/// conflict and skipped. Afterwards a post-order pass removes every
/// now-empty directory under (and including) `source_root`, so a
/// conflict-free merge leaves no trace of the source tree.
pub fn merge_tree(source_root: &Path, dest_root: &Path) -> Result<MergeReport, MergeError> {
  if !dest_root.exists() {
    return Err(MergeError::MissingDestination(dest_root.to_path_buf()));
  }

  debug!(source = %source_root.display(), dest = %dest_root.display(), "merging tree");

  let mut report = MergeReport::default();

  for entry in WalkDir::new(source_root) {
    let entry = entry.map_err(|err| MergeError::Walk {
      path: source_root.to_path_buf(),
      message: err.to_string(),
    })?;

    let rel_path = entry
      .path()
      .strip_prefix(source_root)
      .expect("walked entry is under its root");
    if rel_path.as_os_str().is_empty() {
      continue;
    }
    let dest_path = dest_root.join(rel_path);

    if entry.file_type().is_dir() {
      if !dest_path.exists() {
        std::fs::create_dir_all(&dest_path).map_err(|source| MergeError::Io {
          path: dest_path.clone(),
          source,
        })?;
      }
      continue;
    }

    if dest_path.exists() {
      warn!(file = %rel_path.display(), "skipping existing file");
      report.conflicts.push(rel_path.to_path_buf());
      continue;
    }

    move_file(entry.path(), &dest_path)?;
    report.moved += 1;
  }

  prune_empty_dirs(source_root)?;

  info!(
    moved = report.moved,
    conflicts = report.conflicts.len(),
    "tree merged"
  );
  Ok(report)
}

/// Move a file, falling back to copy-and-remove across filesystems.
fn move_file(source: &Path, dest: &Path) -> Result<(), MergeError> {
  if std::fs::rename(source, dest).is_ok() {
    return Ok(());
  }
  std::fs::copy(source, dest).map_err(|err| MergeError::Io {
    path: dest.to_path_buf(),
    source: err,
  })?;
  std::fs::remove_file(source).map_err(|err| MergeError::Io {
    path: source.to_path_buf(),
    source: err,
  })
}

/// Remove every empty directory under (and including) `root`, children
/// before parents.
fn prune_empty_dirs(root: &Path) -> Result<(), MergeError> {
  for entry in WalkDir::new(root).contents_first(true) {
    let entry = entry.map_err(|err| MergeError::Walk {
      path: root.to_path_buf(),
      message: err.to_string(),
    })?;
    if !entry.file_type().is_dir() {
      continue;
    }
    let is_empty = std::fs::read_dir(entry.path())
      .map(|mut entries| entries.next().is_none())
      .unwrap_or(false);
    if is_empty {
      // A conflict elsewhere may have already kept a sibling alive; only
      // genuinely empty directories go.
      let _ = std::fs::remove_dir(entry.path());
    }
  }
  Ok(())
}

/// Reduce the per-executable output trees under `dist_root` into one.
///
/// Trees after the first merge into the first, in order; the first tree's
/// contents are then flattened into `dist_root` itself. Leftover
/// per-executable directories (kept alive by conflicts) are removed last so
/// no stale subdirectory survives the run.
pub fn consolidate(dist_root: &Path, names: &[String]) -> Result<MergeReport, MergeError> {
  let mut report = MergeReport::default();
  let Some(first) = names.first() else {
    return Ok(report);
  };

  let first_tree = dist_root.join(first);
  for name in &names[1..] {
    let tree = dist_root.join(name);
    report.absorb(merge_tree(&tree, &first_tree)?);
    // Conflicting files keep their directory alive; it holds duplicates of
    // content the first tree already has, and must not shadow an
    // executable of the same name once the first tree is flattened.
    if tree.exists() {
      let _ = std::fs::remove_dir_all(&tree);
    }
  }

  // Flattening moves the first tree's contents into its own parent. Stage
  // the tree under a temporary name first so an executable named like the
  // tree directory does not collide with it mid-walk.
  let staging = dist_root.join(format!(".merge-{}", first));
  std::fs::rename(&first_tree, &staging).map_err(|source| MergeError::Io {
    path: first_tree.clone(),
    source,
  })?;
  report.absorb(merge_tree(&staging, dist_root)?);

  if staging.exists() {
    let _ = std::fs::remove_dir_all(&staging);
  }

  Ok(report)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
  }

  fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
  }

  #[test]
  fn missing_destination_is_an_error() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    std::fs::create_dir(&source).unwrap();

    let result = merge_tree(&source, &temp.path().join("absent"));
    assert!(matches!(result, Err(MergeError::MissingDestination(_))));
  }

  #[test]
  fn empty_source_leaves_destination_unchanged_and_disappears() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("dest");
    std::fs::create_dir(&source).unwrap();
    std::fs::create_dir(&dest).unwrap();
    write(&dest, "keep.txt", "kept");

    let report = merge_tree(&source, &dest).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.moved, 0);
    assert_eq!(read(&dest, "keep.txt"), "kept");
    assert!(!source.exists());
  }

  #[test]
  fn files_move_and_directories_materialize() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("dest");
    std::fs::create_dir(&dest).unwrap();
    write(&source, "a/b/deep.txt", "deep");
    write(&source, "top.txt", "top");

    let report = merge_tree(&source, &dest).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.moved, 2);
    assert_eq!(read(&dest, "a/b/deep.txt"), "deep");
    assert_eq!(read(&dest, "top.txt"), "top");
    assert!(!source.exists());
  }

  #[test]
  fn existing_files_are_never_overwritten() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("src");
    let dest = temp.path().join("dest");
    write(&source, "a/b.txt", "from source");
    write(&dest, "a/b.txt", "original");

    let report = merge_tree(&source, &dest).unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.conflicts, vec![PathBuf::from("a/b.txt")]);
    assert_eq!(read(&dest, "a/b.txt"), "original");
    // The conflicting source file survives in place.
    assert_eq!(read(&source, "a/b.txt"), "from source");
  }

  #[test]
  fn disjoint_merges_converge_regardless_of_order() {
    let build = |first: &str, second: &str| {
      let temp = TempDir::new().unwrap();
      let a = temp.path().join("a");
      let b = temp.path().join("b");
      let dest = temp.path().join("dest");
      std::fs::create_dir(&dest).unwrap();
      write(&a, "only_a/x.txt", "a");
      write(&b, "only_b/y.txt", "b");

      let (first, second) = if first == "a" { (&a, &b) } else { (&b, &a) };
      merge_tree(first, &dest).unwrap();
      merge_tree(second, &dest).unwrap();

      let mut listing: Vec<String> = WalkDir::new(&dest)
        .into_iter()
        .map(|e| {
          e.unwrap()
            .path()
            .strip_prefix(&dest)
            .unwrap()
            .to_string_lossy()
            .to_string()
        })
        .collect();
      listing.sort();
      listing
    };

    assert_eq!(build("a", "b"), build("b", "a"));
  }

  #[test]
  fn consolidate_flattens_into_the_distribution_root() {
    let temp = TempDir::new().unwrap();
    let dist = temp.path();

    // Two freeze outputs with one overlapping shared file each.
    write(dist, "cli_a/cli_a", "exe a");
    write(dist, "cli_a/lib/shared.so", "shared");
    write(dist, "cli_b/cli_b", "exe b");
    write(dist, "cli_b/lib/shared.so", "shared");

    let names = vec!["cli_a".to_string(), "cli_b".to_string()];
    let report = consolidate(dist, &names).unwrap();

    // The duplicate shared library shows up as one conflict but the
    // distribution still carries it exactly once.
    assert_eq!(report.conflicts.len(), 1);
    assert_eq!(read(dist, "cli_a"), "exe a");
    assert_eq!(read(dist, "cli_b"), "exe b");
    assert_eq!(read(dist, "lib/shared.so"), "shared");
    // Both names are plain files at the root now; no per-executable
    // directory survives.
    assert!(dist.join("cli_a").is_file());
    assert!(dist.join("cli_b").is_file());
    assert!(!dist.join(".merge-cli_a").exists());
  }

  #[test]
  fn consolidate_removes_stale_per_executable_directories() {
    let temp = TempDir::new().unwrap();
    let dist = temp.path();
    write(dist, "one/one", "exe");
    write(dist, "one/lib/a.so", "a");

    let report = consolidate(dist, &["one".to_string()]).unwrap();

    assert!(report.is_clean());
    assert!(dist.join("one").is_file());
    assert_eq!(read(dist, "lib/a.so"), "a");
  }

  #[test]
  fn consolidate_with_no_names_is_a_no_op() {
    let temp = TempDir::new().unwrap();
    let report = consolidate(temp.path(), &[]).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.moved, 0);
  }
}
