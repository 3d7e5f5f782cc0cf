//! Snapshot of the installed-package dependency relation.
//!
//! The package index is queried exactly once; the relation then lives in
//! memory as an adjacency map and all closure computation happens against
//! that snapshot. The closure grows monotonically to a least fixed point:
//! passes over the current members keep adding direct dependencies until a
//! full pass adds nothing.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::metadata::{MetadataError, MetadataProvider, PackageRecord, normalize_key};

/// The installed-package universe with its direct dependency edges.
#[derive(Debug, Default, Clone)]
pub struct DependencyUniverse {
  /// Direct dependency edges, keyed by normalized package key.
  edges: BTreeMap<String, Vec<String>>,
}

impl DependencyUniverse {
  /// Query the provider once and snapshot the full relation.
  pub async fn snapshot<P: MetadataProvider>(provider: &P) -> Result<Self, MetadataError> {
    let records = provider.installed_packages().await?;
    Ok(Self::from_records(records))
  }

  /// Build a universe from already-fetched records.
  pub fn from_records(records: Vec<PackageRecord>) -> Self {
    let mut edges = BTreeMap::new();
    for record in records {
      let key = normalize_key(&record.key);
      let deps: Vec<String> = record.dependencies.iter().map(|d| normalize_key(d)).collect();
      edges.insert(key, deps);
    }
    debug!(packages = edges.len(), "dependency universe snapshotted");
    Self { edges }
  }

  /// Number of packages in the snapshot.
  pub fn len(&self) -> usize {
    self.edges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.edges.is_empty()
  }

  /// Direct dependencies of a package, empty when unknown.
  pub fn dependencies(&self, key: &str) -> &[String] {
    self.edges.get(key).map(|deps| deps.as_slice()).unwrap_or(&[])
  }

  /// Transitive closure of the seed set under the dependency relation.
  ///
  /// Repeats full passes over the current members, adding any direct
  /// dependency not yet present, until a pass adds nothing. The result is
  /// a superset of the (normalized) seeds and closed under the relation;
  /// seeds the universe does not know simply contribute no edges.
  pub fn closure<I, S>(&self, seeds: I) -> BTreeSet<String>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut members: BTreeSet<String> =
      seeds.into_iter().map(|s| normalize_key(s.as_ref())).collect();

    let mut updated = true;
    while updated {
      updated = false;
      let current: Vec<String> = members.iter().cloned().collect();
      for key in current {
        for dep in self.dependencies(&key) {
          if members.insert(dep.clone()) {
            trace!(package = %key, dependency = %dep, "closure grew");
            updated = true;
          }
        }
      }
    }

    debug!(members = members.len(), "package closure complete");
    members
  }
}
