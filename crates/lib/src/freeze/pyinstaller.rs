//! PyInstaller-backed freezing engine.
//!
//! Spec generation goes through `pyi-makespec`, builds through
//! `pyinstaller`. Option names map one-to-one onto the engine's CLI
//! surface: `pathex` -> `--paths`, `hiddenimports` -> `--hidden-import`,
//! `binaries` -> `--add-binary`, `datas` -> `--add-data`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{BuildSettings, FreezeError, Freezer};
use crate::options::FreezeOptions;
use crate::util::process::run_checked;

/// Engine driver shelling out to the PyInstaller CLI tools.
#[derive(Debug, Clone)]
pub struct PyInstallerFreezer {
  makespec: String,
  pyinstaller: String,
}

impl Default for PyInstallerFreezer {
  fn default() -> Self {
    Self {
      makespec: "pyi-makespec".to_string(),
      pyinstaller: "pyinstaller".to_string(),
    }
  }
}

impl PyInstallerFreezer {
  /// Use explicit tool names (e.g. venv-local wrappers).
  pub fn with_tools(makespec: impl Into<String>, pyinstaller: impl Into<String>) -> Self {
    Self {
      makespec: makespec.into(),
      pyinstaller: pyinstaller.into(),
    }
  }
}

/// CLI argument list for `pyi-makespec`.
fn makespec_args(scripts: &[PathBuf], options: &FreezeOptions) -> Vec<OsString> {
  let mut args: Vec<OsString> = Vec::new();

  if let Some(name) = &options.name {
    args.push("--name".into());
    args.push(name.into());
  }
  if let Some(specpath) = &options.specpath {
    args.push("--specpath".into());
    args.push(specpath.into());
  }
  for path in &options.pathex {
    args.push("--paths".into());
    args.push(path.into());
  }
  for module in &options.hiddenimports {
    args.push("--hidden-import".into());
    args.push(module.into());
  }
  for entry in &options.binaries {
    args.push("--add-binary".into());
    args.push(entry.into());
  }
  for entry in &options.datas {
    args.push("--add-data".into());
    args.push(entry.into());
  }
  for script in scripts {
    args.push(script.into());
  }

  args
}

impl Freezer for PyInstallerFreezer {
  async fn make_spec(
    &self,
    scripts: &[PathBuf],
    options: &FreezeOptions,
  ) -> Result<PathBuf, FreezeError> {
    let args = makespec_args(scripts, options);
    debug!(tool = %self.makespec, args = args.len(), "generating spec");
    run_checked(&self.makespec, &args).await?;

    // pyi-makespec writes `<name>.spec` under the spec path.
    let name = options.name.as_deref().unwrap_or("launcher");
    let spec_dir = options
      .specpath
      .clone()
      .unwrap_or_else(|| PathBuf::from("."));
    Ok(spec_dir.join(format!("{}.spec", name)))
  }

  async fn build(&self, spec_file: &Path, settings: &BuildSettings) -> Result<(), FreezeError> {
    let mut args: Vec<OsString> = Vec::new();
    if settings.no_confirm {
      args.push("--noconfirm".into());
    }
    args.push("--workpath".into());
    args.push(settings.work_path.clone().into());
    args.push("--distpath".into());
    args.push(settings.dist_path.clone().into());
    args.push(spec_file.into());

    debug!(tool = %self.pyinstaller, spec = %spec_file.display(), "building");
    run_checked(&self.pyinstaller, &args).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn makespec_args_cover_every_option() {
    let mut options = FreezeOptions::default();
    options.name = Some("cli_a".to_string());
    options.specpath = Some(PathBuf::from("/work"));
    options.pathex = vec![PathBuf::from("/site"), PathBuf::from("/work")];
    options.hiddenimports = vec!["pkg.hidden".to_string()];
    options.binaries = vec!["/site/ext.so:.".to_string()];
    options.datas = vec!["assets/logo.png:assets".to_string()];

    let scripts = vec![PathBuf::from("/work/cli_a.py.abc.py")];
    let args = makespec_args(&scripts, &options);
    let rendered: Vec<String> = args
      .iter()
      .map(|a| a.to_string_lossy().to_string())
      .collect();

    assert_eq!(
      rendered,
      vec![
        "--name",
        "cli_a",
        "--specpath",
        "/work",
        "--paths",
        "/site",
        "--paths",
        "/work",
        "--hidden-import",
        "pkg.hidden",
        "--add-binary",
        "/site/ext.so:.",
        "--add-data",
        "assets/logo.png:assets",
        "/work/cli_a.py.abc.py",
      ]
    );
  }

  #[test]
  fn makespec_args_omit_unset_scalars() {
    let options = FreezeOptions::default();
    let args = makespec_args(&[PathBuf::from("x.py")], &options);
    assert_eq!(args.len(), 1);
  }
}
