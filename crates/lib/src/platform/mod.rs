//! Host platform identification and output directory naming.
//!
//! Frozen output lands in a directory whose name encodes the platform family
//! and interpreter version it was built for, e.g. `exe.linux-x86_64-3.11`.
//! Bundles from one consistent environment share a directory; bundles from a
//! different interpreter or host land elsewhere.

use std::fmt;

/// Operating system families permafrost can build on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the current operating system at runtime.
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Lowercase identifier used in output directory names.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "darwin",
      Self::Windows => "windows",
    }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// CPU architectures permafrost can build on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X86_64,
  Aarch64,
}

impl Arch {
  /// Detect the current architecture at runtime.
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86_64" => Some(Self::X86_64),
      "aarch64" => Some(Self::Aarch64),
      _ => None,
    }
  }

  /// Lowercase identifier used in output directory names.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X86_64 => "x86_64",
      Self::Aarch64 => "aarch64",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Name of the output directory for the current host and the given
/// interpreter version, e.g. `exe.linux-x86_64-3.11`.
///
/// Unrecognized hosts fall back to the raw `std::env::consts` values so the
/// name stays unique rather than failing the build.
pub fn output_dir_name(python_version: &str) -> String {
  let os = Os::current().map(|o| o.as_str()).unwrap_or(std::env::consts::OS);
  let arch = Arch::current()
    .map(|a| a.as_str())
    .unwrap_or(std::env::consts::ARCH);
  format!("exe.{}-{}-{}", os, arch, python_version)
}
