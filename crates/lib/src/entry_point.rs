//! Entry point descriptors and the executables built from them.
//!
//! An entry point is a named, installable command mapped to a module and an
//! attribute path to invoke, declared in the conventional
//! `name = module.path:attr.path` form. Each entry point (or explicitly
//! declared script) becomes one [`Executable`] for the run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::FreezeOptions;

/// A declared program entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
  /// The installable command name (also the frozen executable's name).
  pub name: String,

  /// Dotted module path that defines the callable.
  pub module_name: String,

  /// Attribute path within the module, invoked as a zero-argument call.
  pub attrs: Vec<String>,
}

/// Errors from parsing an entry point declaration.
#[derive(Debug, Error)]
pub enum EntryPointError {
  /// The declaration did not match `name = module:attr`.
  #[error("invalid entry point '{spec}': {reason}")]
  Invalid { spec: String, reason: &'static str },
}

impl EntryPoint {
  /// Parse a declaration of the form `name = module.path:attr.path`.
  pub fn parse(spec: &str) -> Result<Self, EntryPointError> {
    let invalid = |reason| EntryPointError::Invalid {
      spec: spec.to_string(),
      reason,
    };

    let (name, target) = spec.split_once('=').ok_or_else(|| invalid("missing '='"))?;
    let name = name.trim();
    if name.is_empty() {
      return Err(invalid("empty name"));
    }

    let (module_name, attr_path) = target.split_once(':').ok_or_else(|| invalid("missing ':'"))?;
    let module_name = module_name.trim();
    if module_name.is_empty() {
      return Err(invalid("empty module path"));
    }

    let attrs: Vec<String> = attr_path
      .trim()
      .split('.')
      .map(|part| part.trim().to_string())
      .collect();
    if attrs.iter().any(|part| part.is_empty()) {
      return Err(invalid("empty attribute path"));
    }

    Ok(Self {
      name: name.to_string(),
      module_name: module_name.to_string(),
      attrs,
    })
  }

  /// The attribute path joined back into dotted form.
  pub fn attr_path(&self) -> String {
    self.attrs.join(".")
  }
}

impl std::fmt::Display for EntryPoint {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{} = {}:{}", self.name, self.module_name, self.attr_path())
  }
}

/// One executable to freeze.
///
/// Created when its launcher is synthesized, mutated through option
/// resolution and uniquification, read-only once freezing starts, and
/// discarded after its output tree has been merged.
#[derive(Debug, Clone)]
pub struct Executable {
  /// The launcher script. Reassigned once at synthesis and once more when
  /// the script is uniquified.
  pub script: PathBuf,

  /// Fully resolved freeze options for this executable.
  pub options: FreezeOptions,
}

impl Executable {
  pub fn new(script: PathBuf) -> Self {
    Self {
      script,
      options: FreezeOptions::default(),
    }
  }

  /// The resolved executable name, if option merging has assigned one.
  pub fn resolved_name(&self) -> Option<&str> {
    self.options.name.as_deref()
  }
}
