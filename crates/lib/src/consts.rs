//! Shared constants for permafrost.

/// File suffixes identifying native shared objects in package file manifests.
pub const BINARY_SUFFIXES: &[&str] = &["so", "pyd", "dll"];

/// File suffixes identifying interpretable modules (source or precompiled).
pub const MODULE_SUFFIXES: &[&str] = &["py", "pyc"];

/// Length of the short content digest appended to launcher script names.
pub const SCRIPT_DIGEST_LEN: usize = 12;

/// Default project manifest file name.
pub const MANIFEST_FILE: &str = "permafrost.toml";

/// Name of the scratch directory under the build base. Removed and
/// recreated at the start of every run.
pub const WORK_DIR: &str = "frost-work";

/// Default build base directory, relative to the manifest.
pub const BUILD_BASE: &str = "build";
