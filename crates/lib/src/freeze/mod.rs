//! Driving the external freezing engine.
//!
//! The engine itself (dependency tracing inside the frozen script,
//! compression, bootstrap generation) is entirely delegated; this module is
//! the sole integration point. One invocation per executable, strictly
//! sequential: the engine is assumed to hold process-wide state that is
//! unsafe to share across concurrent invocations.

pub mod pyinstaller;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::entry_point::Executable;
use crate::options::FreezeOptions;
use crate::util::process::ProcessError;

/// Settings for one engine build invocation.
#[derive(Debug, Clone)]
pub struct BuildSettings {
  /// Suppress interactive confirmation prompts.
  pub no_confirm: bool,

  /// Directory for the engine's intermediate artifacts.
  pub work_path: PathBuf,

  /// Directory the frozen output tree is written under.
  pub dist_path: PathBuf,
}

/// Errors from driving the freezing engine.
#[derive(Debug, Error)]
pub enum FreezeError {
  /// The engine failed to run or exited with an error.
  #[error(transparent)]
  Tool(#[from] ProcessError),

  /// The executable has no resolved name; a spec cannot be produced.
  #[error("executable has no resolved name: {0}")]
  MissingName(PathBuf),

  /// The launcher script vanished before the engine ran.
  #[error("launcher script does not exist: {0}")]
  MissingScript(PathBuf),

  /// A stale artifact could not be cleared.
  #[error("failed to remove stale spec {path}: {source}")]
  StaleSpec {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// External freezing engine.
pub trait Freezer {
  /// Produce a build specification for the given scripts and options.
  fn make_spec(
    &self,
    scripts: &[PathBuf],
    options: &FreezeOptions,
  ) -> impl Future<Output = Result<PathBuf, FreezeError>>;

  /// Run a build from a specification.
  fn build(
    &self,
    spec_file: &Path,
    settings: &BuildSettings,
  ) -> impl Future<Output = Result<(), FreezeError>>;
}

/// Freeze one executable into `dist_dir`.
///
/// Removes any stale spec for the same resolved name first, then drives the
/// engine with non-interactive confirmation and output directed at
/// `work_dir`/`dist_dir`.
pub async fn freeze_executable<F: Freezer>(
  freezer: &F,
  executable: &Executable,
  work_dir: &Path,
  dist_dir: &Path,
) -> Result<(), FreezeError> {
  let name = executable
    .resolved_name()
    .ok_or_else(|| FreezeError::MissingName(executable.script.clone()))?;

  if !executable.script.is_file() {
    return Err(FreezeError::MissingScript(executable.script.clone()));
  }

  let spec_dir = executable
    .options
    .specpath
    .clone()
    .unwrap_or_else(|| work_dir.to_path_buf());
  let stale_spec = spec_dir.join(format!("{}.spec", name));
  match std::fs::remove_file(&stale_spec) {
    Ok(()) => debug!(spec = %stale_spec.display(), "removed stale spec"),
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
    Err(source) => {
      return Err(FreezeError::StaleSpec {
        path: stale_spec,
        source,
      });
    }
  }

  info!(executable = name, script = %executable.script.display(), "freezing");

  let scripts = vec![executable.script.clone()];
  let spec_file = freezer.make_spec(&scripts, &executable.options).await?;

  let settings = BuildSettings {
    no_confirm: true,
    work_path: work_dir.to_path_buf(),
    dist_path: dist_dir.to_path_buf(),
  };
  freezer.build(&spec_file, &settings).await?;

  info!(executable = name, "frozen");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::Mutex;
  use tempfile::TempDir;

  #[derive(Default)]
  struct RecordingFreezer {
    calls: Mutex<Vec<String>>,
  }

  impl Freezer for RecordingFreezer {
    async fn make_spec(
      &self,
      scripts: &[PathBuf],
      options: &FreezeOptions,
    ) -> Result<PathBuf, FreezeError> {
      let name = options.name.clone().unwrap();
      self.calls.lock().unwrap().push(format!("make_spec {}", name));
      let spec_dir = options.specpath.clone().unwrap();
      let spec = spec_dir.join(format!("{}.spec", name));
      std::fs::write(&spec, scripts[0].display().to_string()).unwrap();
      Ok(spec)
    }

    async fn build(&self, spec_file: &Path, settings: &BuildSettings) -> Result<(), FreezeError> {
      assert!(settings.no_confirm);
      self
        .calls
        .lock()
        .unwrap()
        .push(format!("build {}", spec_file.file_name().unwrap().to_string_lossy()));
      Ok(())
    }
  }

  fn executable(temp: &TempDir, name: &str) -> Executable {
    let script = temp.path().join(format!("{}.py", name));
    std::fs::write(&script, "import pkg\n").unwrap();
    let mut exe = Executable::new(script);
    exe.options.name = Some(name.to_string());
    exe.options.specpath = Some(temp.path().to_path_buf());
    exe
  }

  #[tokio::test]
  async fn freeze_makes_spec_then_builds() {
    let temp = TempDir::new().unwrap();
    let freezer = RecordingFreezer::default();
    let exe = executable(&temp, "cli_a");

    freeze_executable(&freezer, &exe, temp.path(), temp.path())
      .await
      .unwrap();

    let calls = freezer.calls.lock().unwrap();
    assert_eq!(*calls, vec!["make_spec cli_a", "build cli_a.spec"]);
  }

  #[tokio::test]
  async fn stale_spec_is_removed_before_the_engine_runs() {
    let temp = TempDir::new().unwrap();
    let freezer = RecordingFreezer::default();
    let exe = executable(&temp, "cli_a");

    let stale = temp.path().join("cli_a.spec");
    std::fs::write(&stale, "stale content").unwrap();

    freeze_executable(&freezer, &exe, temp.path(), temp.path())
      .await
      .unwrap();

    // The spec present afterwards is the freshly generated one.
    let content = std::fs::read_to_string(&stale).unwrap();
    assert_ne!(content, "stale content");
  }

  #[tokio::test]
  async fn missing_name_is_rejected() {
    let temp = TempDir::new().unwrap();
    let freezer = RecordingFreezer::default();
    let script = temp.path().join("anon.py");
    std::fs::write(&script, "").unwrap();
    let exe = Executable::new(script);

    let result = freeze_executable(&freezer, &exe, temp.path(), temp.path()).await;
    assert!(matches!(result, Err(FreezeError::MissingName(_))));
  }

  #[tokio::test]
  async fn missing_script_is_rejected() {
    let temp = TempDir::new().unwrap();
    let freezer = RecordingFreezer::default();
    let mut exe = Executable::new(temp.path().join("gone.py"));
    exe.options.name = Some("gone".to_string());

    let result = freeze_executable(&freezer, &exe, temp.path(), temp.path()).await;
    assert!(matches!(result, Err(FreezeError::MissingScript(_))));
  }
}
