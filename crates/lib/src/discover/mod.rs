//! Automatic dependency discovery.
//!
//! Starting from the declared requirement keys, discovery computes the
//! transitive package closure against a one-shot snapshot of the installed
//! universe, scans every closure member's owned files, and turns the result
//! into an option fragment: hidden-import names for module files the module
//! map can name, and search-path/binary entries for native shared objects.
//!
//! Discovery is an optimization, never a requirement: if the universe
//! cannot be snapshotted the caller falls back to declared options, and a
//! module file the map cannot name is reported as a warning rather than
//! failing the build.

mod universe;

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info, warn};

pub use universe::DependencyUniverse;

use crate::metadata::{DiscoveredFiles, MetadataError, MetadataProvider, files_owned_by};
use crate::modules::{ModuleError, ModuleFinder, ModuleMap, collect_module_map};
use crate::options::FreezeOptions;

/// Errors that make discovery unavailable as a whole.
#[derive(Debug, Error)]
pub enum DiscoverError {
  /// The package index could not be queried.
  #[error("package index unavailable: {0}")]
  Metadata(#[from] MetadataError),

  /// The module finder could not enumerate modules.
  #[error("module enumeration failed: {0}")]
  Modules(#[from] ModuleError),
}

/// The auto-discovered option fragment.
#[derive(Debug, Default, Clone)]
pub struct Discovery {
  /// Packages in the final closure.
  pub packages: BTreeSet<String>,

  /// Option fragment to merge between defaults and overrides.
  pub options: FreezeOptions,

  /// Module files the module map could not name. The modules they define
  /// may be missing from the bundle.
  pub unresolvable: Vec<PathBuf>,
}

/// Run dependency discovery for the given seed packages.
pub async fn discover<P, F>(
  provider: &P,
  finder: &F,
  seeds: &[String],
) -> Result<Discovery, DiscoverError>
where
  P: MetadataProvider,
  F: ModuleFinder,
{
  info!(seeds = seeds.len(), "starting dependency discovery");

  let module_map = collect_module_map(finder).await?;
  let universe = DependencyUniverse::snapshot(provider).await?;
  let packages = universe.closure(seeds.iter().map(|s| s.as_str()));

  let mut files = DiscoveredFiles::default();
  for package in &packages {
    files.extend(files_owned_by(provider, package).await?);
  }

  let discovery = resolve_files(packages, &files, &module_map);

  info!(
    packages = discovery.packages.len(),
    hidden_imports = discovery.options.hiddenimports.len(),
    search_paths = discovery.options.pathex.len(),
    unresolvable = discovery.unresolvable.len(),
    "discovery complete"
  );

  Ok(discovery)
}

/// Join discovered files against the module map and fold binaries into the
/// option fragment.
fn resolve_files(
  packages: BTreeSet<String>,
  files: &DiscoveredFiles,
  module_map: &ModuleMap,
) -> Discovery {
  let mut discovery = Discovery {
    packages,
    ..Default::default()
  };

  for file in &files.module_files {
    match module_map.get(file) {
      Some(name) => discovery.options.push_hidden_import(name.clone()),
      None => {
        warn!(file = %file.display(), "unable to name module file");
        discovery.unresolvable.push(file.clone());
      }
    }
  }

  for file in &files.binary_files {
    if let Some(parent) = file.parent() {
      discovery.options.push_search_path(parent);
    }
    discovery.options.push_binary(format!("{}:.", file.display()));
  }

  debug!(
    binaries = discovery.options.binaries.len(),
    "binary files folded into options"
  );

  discovery
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::metadata::{PackageInfo, PackageRecord};
  use std::collections::BTreeMap;
  use tempfile::TempDir;

  struct FakeProvider {
    records: Vec<PackageRecord>,
    info: BTreeMap<String, PackageInfo>,
    fail_universe: bool,
  }

  impl MetadataProvider for FakeProvider {
    async fn installed_packages(&self) -> Result<Vec<PackageRecord>, MetadataError> {
      if self.fail_universe {
        return Err(MetadataError::Parse {
          tool: "pipdeptree",
          message: "unavailable".to_string(),
        });
      }
      Ok(self.records.clone())
    }

    async fn show_package(&self, key: &str) -> Result<Option<PackageInfo>, MetadataError> {
      Ok(self.info.get(key).cloned())
    }
  }

  struct FakeFinder {
    records: Vec<crate::modules::ModuleRecord>,
  }

  impl ModuleFinder for FakeFinder {
    async fn modules(&self) -> Result<Vec<crate::modules::ModuleRecord>, ModuleError> {
      Ok(self.records.clone())
    }
  }

  fn module_record(name: &str, file: &std::path::Path) -> crate::modules::ModuleRecord {
    crate::modules::ModuleRecord {
      name: name.to_string(),
      is_package: false,
      loader_filename: Some(file.to_path_buf()),
      file_attribute: None,
    }
  }

  #[tokio::test]
  async fn discovers_transitive_hidden_imports_and_binary_paths() {
    let temp = TempDir::new().unwrap();
    let site = temp.path();
    std::fs::create_dir_all(site.join("dep")).unwrap();
    std::fs::write(site.join("dep/__init__.py"), "").unwrap();
    std::fs::write(site.join("dep/_native.so"), "").unwrap();

    let provider = FakeProvider {
      records: vec![
        PackageRecord {
          key: "app".to_string(),
          dependencies: vec!["dep".to_string()],
        },
        PackageRecord {
          key: "dep".to_string(),
          dependencies: vec![],
        },
      ],
      info: BTreeMap::from([(
        "dep".to_string(),
        PackageInfo {
          location: site.to_path_buf(),
          files: Some(vec![
            PathBuf::from("dep/__init__.py"),
            PathBuf::from("dep/_native.so"),
          ]),
        },
      )]),
      fail_universe: false,
    };

    let dep_init = dunce::canonicalize(site.join("dep/__init__.py")).unwrap();
    let finder = FakeFinder {
      records: vec![module_record("dep", &dep_init)],
    };

    let discovery = discover(&provider, &finder, &["app".to_string()]).await.unwrap();

    assert!(discovery.packages.contains("app"));
    assert!(discovery.packages.contains("dep"));
    assert_eq!(discovery.options.hiddenimports, vec!["dep"]);
    let native_dir = dunce::canonicalize(site.join("dep")).unwrap();
    assert!(discovery.options.pathex.contains(&native_dir));
    assert_eq!(discovery.options.binaries.len(), 1);
    assert!(discovery.unresolvable.is_empty());
  }

  #[tokio::test]
  async fn unresolvable_module_files_become_warnings() {
    let temp = TempDir::new().unwrap();
    let site = temp.path();
    std::fs::create_dir_all(site.join("dep")).unwrap();
    std::fs::write(site.join("dep/orphan.py"), "").unwrap();

    let provider = FakeProvider {
      records: vec![PackageRecord {
        key: "dep".to_string(),
        dependencies: vec![],
      }],
      info: BTreeMap::from([(
        "dep".to_string(),
        PackageInfo {
          location: site.to_path_buf(),
          files: Some(vec![PathBuf::from("dep/orphan.py")]),
        },
      )]),
      fail_universe: false,
    };
    let finder = FakeFinder { records: vec![] };

    let discovery = discover(&provider, &finder, &["dep".to_string()]).await.unwrap();

    assert!(discovery.options.hiddenimports.is_empty());
    assert_eq!(discovery.unresolvable.len(), 1);
  }

  #[tokio::test]
  async fn universe_failure_fails_discovery_as_a_whole() {
    let provider = FakeProvider {
      records: vec![],
      info: BTreeMap::new(),
      fail_universe: true,
    };
    let finder = FakeFinder { records: vec![] };

    let result = discover(&provider, &finder, &["app".to_string()]).await;
    assert!(matches!(result, Err(DiscoverError::Metadata(_))));
  }
}
