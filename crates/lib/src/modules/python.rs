//! Interpreter-backed module finder.
//!
//! Runs a small helper inside the target interpreter that walks the active
//! search path and prints one JSON record per importable module. Resolution
//! failures inside the helper surface as `null` candidates, which the
//! locator then skips; the helper itself never aborts the enumeration.

use std::path::PathBuf;

use serde::Deserialize;

use super::{ModuleError, ModuleFinder, ModuleRecord};
use crate::util::process::run_capture;

/// Helper executed with `python -c`. One JSON object per line.
const FINDER_HELPER: &str = r#"
import json, pkgutil, sys

for finder, name, is_package in pkgutil.walk_packages():
    record = {"name": name, "is_package": is_package,
              "loader_filename": None, "file_attribute": None}
    try:
        record["loader_filename"] = finder.find_spec(name).loader.get_filename(name)
    except Exception:
        pass
    try:
        module = __import__(name)
        for part in name.split(".")[1:]:
            module = getattr(module, part)
        record["file_attribute"] = getattr(module, "__file__", None)
    except Exception:
        pass
    sys.stdout.write(json.dumps(record) + "\n")
"#;

/// Module finder backed by the target interpreter.
#[derive(Debug, Clone)]
pub struct PythonModuleFinder {
  python: String,
}

impl Default for PythonModuleFinder {
  fn default() -> Self {
    Self {
      python: "python3".to_string(),
    }
  }
}

impl PythonModuleFinder {
  /// Use an explicit interpreter (e.g. a venv's `python`).
  pub fn with_interpreter(python: impl Into<String>) -> Self {
    Self { python: python.into() }
  }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
  name: String,
  is_package: bool,
  loader_filename: Option<PathBuf>,
  file_attribute: Option<PathBuf>,
}

impl ModuleFinder for PythonModuleFinder {
  async fn modules(&self) -> Result<Vec<ModuleRecord>, ModuleError> {
    let raw = run_capture(&self.python, ["-c", FINDER_HELPER]).await?;
    parse_records(&raw)
  }
}

fn parse_records(raw: &str) -> Result<Vec<ModuleRecord>, ModuleError> {
  raw
    .lines()
    .filter(|line| !line.trim().is_empty())
    .map(|line| {
      let record: RawRecord = serde_json::from_str(line).map_err(|err| ModuleError::Parse {
        message: format!("{}: {}", err, line),
      })?;
      Ok(ModuleRecord {
        name: record.name,
        is_package: record.is_package,
        loader_filename: record.loader_filename,
        file_attribute: record.file_attribute,
      })
    })
    .collect()
}

/// The `major.minor` version of the target interpreter.
pub async fn interpreter_version(python: &str) -> Result<String, ModuleError> {
  let raw = run_capture(
    python,
    ["-c", "import sys; print('%d.%d' % sys.version_info[:2])"],
  )
  .await?;
  let version = raw.trim().to_string();
  if version.is_empty() {
    return Err(ModuleError::Parse {
      message: "interpreter reported no version".to_string(),
    });
  }
  Ok(version)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_records_reads_json_lines() {
    let raw = r#"
{"name": "pkg", "is_package": true, "loader_filename": "/site/pkg/__init__.py", "file_attribute": null}
{"name": "pkg.a", "is_package": false, "loader_filename": null, "file_attribute": "/site/pkg/a.py"}
"#;

    let records = parse_records(raw).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records[0].is_package);
    assert_eq!(
      records[0].loader_filename,
      Some(PathBuf::from("/site/pkg/__init__.py"))
    );
    assert!(records[1].loader_filename.is_none());
  }

  #[test]
  fn parse_records_rejects_garbage() {
    assert!(matches!(
      parse_records("{broken"),
      Err(ModuleError::Parse { .. })
    ));
  }
}
