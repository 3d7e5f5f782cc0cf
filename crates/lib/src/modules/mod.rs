//! Module enumeration and file-to-name mapping.
//!
//! The module finder is an external collaborator that enumerates every
//! importable module on the active search path and reports up to two
//! candidate defining files per module: the loader-reported filename and
//! the attribute-based lookup. [`collect_module_map`] tries those
//! strategies in order; a module with no resolvable file cannot be bundled
//! by path and is silently skipped.
//!
//! The map is built exactly once per run and read-only afterwards.

pub mod python;

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, trace};

use crate::util::paths::absolutize;
use crate::util::process::ProcessError;

/// Absolute defining-file path to dotted module name.
pub type ModuleMap = BTreeMap<PathBuf, String>;

/// One enumerated module with its candidate defining files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
  /// Dotted import name.
  pub name: String,

  /// Whether the module is a package.
  pub is_package: bool,

  /// File reported by the module's loader, when the loader could name one.
  pub loader_filename: Option<PathBuf>,

  /// File reported by attribute lookup, the fallback for namespace or
  /// lazily-loaded modules.
  pub file_attribute: Option<PathBuf>,
}

/// Errors from enumerating modules.
#[derive(Debug, Error)]
pub enum ModuleError {
  /// The finder tool failed to run or exited with an error.
  #[error(transparent)]
  Tool(#[from] ProcessError),

  /// The finder produced output this crate cannot interpret.
  #[error("unexpected module finder output: {message}")]
  Parse { message: String },
}

/// External module finder.
pub trait ModuleFinder {
  /// Enumerate every discoverable module exactly once.
  fn modules(&self) -> impl Future<Output = Result<Vec<ModuleRecord>, ModuleError>>;
}

/// Resolution strategies in preference order.
fn resolve_file(record: &ModuleRecord) -> Option<&PathBuf> {
  let strategies: [fn(&ModuleRecord) -> Option<&PathBuf>; 2] = [
    |r| r.loader_filename.as_ref(),
    |r| r.file_attribute.as_ref(),
  ];
  strategies.iter().find_map(|strategy| strategy(record))
}

/// Build the file-to-name map for every module the finder reports.
pub async fn collect_module_map<F: ModuleFinder>(finder: &F) -> Result<ModuleMap, ModuleError> {
  let records = finder.modules().await?;
  let total = records.len();

  let mut map = ModuleMap::new();
  for record in &records {
    match resolve_file(record) {
      Some(file) => {
        map.insert(absolutize(file), record.name.clone());
      }
      None => {
        trace!(module = %record.name, "no resolvable file, skipping");
      }
    }
  }

  debug!(resolved = map.len(), enumerated = total, "module map built");
  Ok(map)
}
