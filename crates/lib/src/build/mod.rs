//! Build orchestration.
//!
//! The full flow for one run:
//!
//! 1. Parse entry points and reject duplicate executable names
//! 2. Recreate the work and output directories
//! 3. Synthesize a launcher per entry point, stage declared scripts
//! 4. Resolve options: defaults -> discovered -> per-executable overrides
//! 5. Uniquify every launcher name
//! 6. Freeze each executable, strictly in sequence
//! 7. Consolidate the output trees into the distribution root
//! 8. Remove the work directory and stale per-executable directories
//!
//! Configuration problems abort before any freeze begins; discovery
//! problems degrade to warnings; engine failures abort the run rather than
//! producing a silently broken bundle.

mod types;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

pub use types::{BuildError, BuildReport, BuildRequest, Warning};

use crate::consts::WORK_DIR;
use crate::discover::discover;
use crate::entry_point::Executable;
use crate::freeze::{Freezer, freeze_executable};
use crate::merge::consolidate;
use crate::metadata::MetadataProvider;
use crate::modules::ModuleFinder;
use crate::options::FreezeOptions;
use crate::platform::output_dir_name;
use crate::script::{import_name, script_name, synthesize, uniquify};
use crate::util::paths::absolutize;

/// Run a full build.
pub async fn run_build<P, F, Z>(
  request: &BuildRequest,
  provider: &P,
  finder: &F,
  freezer: &Z,
) -> Result<BuildReport, BuildError>
where
  P: MetadataProvider,
  F: ModuleFinder,
  Z: Freezer,
{
  let manifest = &request.manifest;
  let entry_points = manifest.entry_points()?;

  // Reject colliding executable names before touching the filesystem.
  let mut seen = BTreeSet::new();
  for name in entry_points
    .iter()
    .map(|ep| ep.name.clone())
    .chain(manifest.project.scripts.iter().map(|s| script_name(s)))
  {
    if !seen.insert(name.clone()) {
      return Err(BuildError::DuplicateName { name });
    }
  }
  if seen.is_empty() {
    return Err(BuildError::NoExecutables);
  }

  let work_dir = request.build_base.join(WORK_DIR);
  let dist_dir = request
    .build_base
    .join(output_dir_name(&request.python_version));
  for dir in [&work_dir, &dist_dir] {
    let _ = std::fs::remove_dir_all(dir);
    std::fs::create_dir_all(dir)?;
  }

  info!(
    executables = seen.len(),
    work = %work_dir.display(),
    dist = %dist_dir.display(),
    "starting build"
  );

  // Launchers for entry points, staged copies for declared scripts.
  let mut scripts: Vec<PathBuf> = Vec::new();
  for entry_point in &entry_points {
    scripts.push(synthesize(
      entry_point,
      &manifest.project.packages,
      &manifest.project.requires,
      &work_dir,
    )?);
  }
  for declared in &manifest.project.scripts {
    scripts.push(stage_script(declared, &work_dir)?);
  }

  // Run-wide defaults: manifest options plus hidden imports for every
  // declared requirement.
  let mut defaults = FreezeOptions::default();
  defaults.merge_from(&manifest.options);
  for key in manifest.requirement_keys() {
    defaults.push_hidden_import(import_name(&key));
  }

  let mut warnings: Vec<Warning> = Vec::new();
  let discovered = if request.discovery {
    match discover(provider, finder, &manifest.requirement_keys()).await {
      Ok(discovery) => {
        warnings.extend(
          discovery
            .unresolvable
            .into_iter()
            .map(|file| Warning::UnresolvableModule { file }),
        );
        discovery.options
      }
      Err(err) => {
        warn!(error = %err, "discovery unavailable, using declared options only");
        warnings.push(Warning::DiscoveryUnavailable {
          message: err.to_string(),
        });
        FreezeOptions::default()
      }
    }
  } else {
    FreezeOptions::default()
  };

  // Resolve and validate options for every executable before any freeze.
  let mut executables: Vec<Executable> = Vec::new();
  for script in scripts {
    let name = script_name(&script);
    let overrides = manifest.executables.get(&name).cloned().unwrap_or_default();

    let mut executable = Executable::new(script);
    executable.options = FreezeOptions::merged([&defaults, &discovered, &overrides]);
    executable.options.validate()?;

    executable.options.name = Some(overrides.name.unwrap_or(name));
    if executable.options.specpath.is_none() {
      executable.options.specpath = Some(absolutize(&work_dir));
    }
    executable.options.push_search_path(&work_dir);

    executables.push(executable);
  }

  // Uniquify after names are resolved so a launcher can never shadow a
  // real module inside the frozen bundle.
  for executable in &mut executables {
    executable.script = uniquify(&executable.script)?;
  }

  // One engine invocation per executable, fully sequential.
  let names: Vec<String> = executables
    .iter()
    .map(|exe| exe.resolved_name().unwrap_or_default().to_string())
    .collect();
  for executable in &executables {
    freeze_executable(freezer, executable, &work_dir, &dist_dir)
      .await
      .map_err(|source| BuildError::Freeze {
        name: executable.resolved_name().unwrap_or_default().to_string(),
        source,
      })?;
  }

  let merge_report = consolidate(&dist_dir, &names)?;
  warnings.extend(
    merge_report
      .conflicts
      .iter()
      .cloned()
      .map(|file| Warning::MergeConflict { file }),
  );

  let _ = std::fs::remove_dir_all(&work_dir);

  if warnings.is_empty() {
    info!(executables = names.len(), dist = %dist_dir.display(), "build complete");
  } else {
    warn!(
      executables = names.len(),
      warnings = warnings.len(),
      "build complete with degraded output"
    );
  }

  Ok(BuildReport {
    dist_dir,
    executables: names,
    files_merged: merge_report.moved,
    warnings,
  })
}

/// Copy a declared script into the work directory so uniquification never
/// touches the user's source tree.
fn stage_script(declared: &Path, work_dir: &Path) -> Result<PathBuf, BuildError> {
  if !declared.is_file() {
    return Err(BuildError::ScriptNotFound(declared.to_path_buf()));
  }
  let file_name = declared
    .file_name()
    .ok_or_else(|| BuildError::ScriptNotFound(declared.to_path_buf()))?;
  let staged = work_dir.join(file_name);
  std::fs::copy(declared, &staged)?;
  Ok(staged)
}
