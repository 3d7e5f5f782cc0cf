//! External tool invocation with captured output.
//!
//! Every collaborator (the package index, the module finder, the freezing
//! engine) is reached through a subprocess. This module provides the one
//! shared way to spawn such a tool and capture its stdout, with failures
//! reported as typed errors rather than hangs or panics.

use std::ffi::OsStr;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors from running an external tool.
#[derive(Debug, Error)]
pub enum ProcessError {
  /// The tool could not be spawned (not installed, not on PATH).
  #[error("failed to run {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: std::io::Error,
  },

  /// The tool ran but exited with a failure status.
  #[error("{program} exited with status {code:?}")]
  Failed {
    program: String,
    code: Option<i32>,
    stderr: String,
  },
}

/// Run `program` with `args` and return its stdout as a string.
///
/// Inherits the caller's environment: the tools driven here must see the
/// same interpreter and search paths the user's shell would.
pub async fn run_capture<I, S>(program: &str, args: I) -> Result<String, ProcessError>
where
  I: IntoIterator<Item = S>,
  S: AsRef<OsStr>,
{
  debug!(program, "spawning tool");

  let output = Command::new(program)
    .args(args)
    .output()
    .await
    .map_err(|source| ProcessError::Spawn {
      program: program.to_string(),
      source,
    })?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
      debug!(program, stderr = %stderr, "tool stderr");
    }
    return Err(ProcessError::Failed {
      program: program.to_string(),
      code: output.status.code(),
      stderr,
    });
  }

  Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Run `program` with `args`, discarding stdout.
pub async fn run_checked<I, S>(program: &str, args: I) -> Result<(), ProcessError>
where
  I: IntoIterator<Item = S>,
  S: AsRef<OsStr>,
{
  run_capture(program, args).await.map(|_| ())
}
