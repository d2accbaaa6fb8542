//! Project mutations performed during conversion
//!
//! All edits happen on the in-memory document; [`apply`] ends with the single
//! save that commits them.

use crate::config::ConverterConfig;
use crate::error::ConversionError;
use crate::xcode::{ShellScriptPhase, Target, XcodeProject};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of the packager build phase step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagerOutcome {
    Added { phase_id: String },
    /// The app target already has a packager phase, left as it is
    Existing { phase_id: String },
    /// The React project could not be opened; the phase was not added
    Skipped { reason: String },
}

/// Summary of what [`apply`] changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReport {
    /// `(target name, library file name)` for every removed link
    pub removed_libraries: Vec<(String, String)>,
    pub packager: PackagerOutcome,
    /// Objects deleted along with the Libraries group
    pub removed_objects: usize,
}

/// Rewrites script references to React's `scripts` directory so they resolve
/// from the app's `ios` directory. Literal substring replacement; applying it
/// twice changes nothing.
pub fn rewrite_script(script: &str, scripts_path: &str) -> String {
    script.replace("../scripts", scripts_path)
}

/// The first build phase of `target` whose name matches `pattern`
pub fn find_packager_phase(
    project: &XcodeProject,
    target_id: &str,
    pattern: &Regex,
) -> Option<(String, ShellScriptPhase)> {
    project
        .build_phases(target_id)
        .into_iter()
        .filter(|id| {
            project
                .build_phase_name(id)
                .is_some_and(|name| pattern.is_match(&name))
        })
        .find_map(|id| project.shell_script_phase(&id).map(|phase| (id, phase)))
}

/// The packager phase of the React project's first target
pub fn source_packager_phase(
    react: &XcodeProject,
    pattern: &Regex,
) -> Result<ShellScriptPhase, ConversionError> {
    react
        .targets()
        .first()
        .and_then(|target| find_packager_phase(react, &target.id, pattern))
        .map(|(_, phase)| phase)
        .ok_or_else(|| ConversionError::PackagerPhaseNotFound(react.path().to_path_buf()))
}

/// Removes `lib<name>.a` links for the given libraries from every target
/// except the secondary-platform ones
pub fn remove_static_libraries(
    project: &mut XcodeProject,
    libraries: &[String],
    config: &ConverterConfig,
) -> Result<Vec<(String, String)>, ConversionError> {
    let secondary = config.secondary_target_regex()?;
    let static_library = config.static_library_regex()?;

    let mut removed = Vec::new();
    for target in project.targets() {
        if secondary.is_match(&target.name) {
            debug!(target = %target.name, "Leaving secondary target untouched");
            continue;
        }
        for file in project.remove_static_libraries(&target.id, &static_library, libraries) {
            info!(target = %target.name, library = %file, "Removed static library");
            removed.push((target.name.clone(), file));
        }
    }
    Ok(removed)
}

/// Copies the packager phase from the React project at `react_path` to the
/// front of the app target's build phases, unless the app target already
/// has one
pub fn add_packager_phase(
    project: &mut XcodeProject,
    app_target: &Target,
    react_path: &Path,
    config: &ConverterConfig,
) -> Result<PackagerOutcome, ConversionError> {
    let pattern = config.packager_phase_regex()?;
    if let Some((phase_id, phase)) = find_packager_phase(project, &app_target.id, &pattern) {
        info!(phase = %phase.name, target = %app_target.name, "Packager build phase already present");
        return Ok(PackagerOutcome::Existing { phase_id });
    }

    let react = match XcodeProject::open(react_path) {
        Ok(react) => react,
        Err(err) => {
            warn!(error = %err, "Cannot open the React project; not adding a packager phase");
            return Ok(PackagerOutcome::Skipped {
                reason: err.to_string(),
            });
        }
    };

    let source = source_packager_phase(&react, &pattern)?;

    let phase = ShellScriptPhase {
        name: config.packager_phase_name.clone(),
        script: rewrite_script(&source.script, &config.packager_scripts_path()),
        ..source
    };
    let phase_id = project
        .add_shell_script_phase(&app_target.id, &phase, 0)
        .ok_or_else(|| ConversionError::InvalidProject {
            path: project.path().to_path_buf(),
            reason: format!("target {} disappeared", app_target.name),
        })?;

    info!(phase = %phase.name, target = %app_target.name, "Added packager build phase");
    Ok(PackagerOutcome::Added { phase_id })
}

/// Removes the Libraries group and everything it owns
pub fn remove_libraries_group(project: &mut XcodeProject, config: &ConverterConfig) -> usize {
    match project.find_group(&config.libraries_group) {
        Some(group) => project.remove_group(&group),
        None => 0,
    }
}

/// Runs every conversion edit and saves the project
pub fn apply(
    project: &mut XcodeProject,
    app_target: &Target,
    libraries: &[String],
    react_path: &Path,
    config: &ConverterConfig,
) -> Result<MutationReport, ConversionError> {
    let removed_libraries = remove_static_libraries(project, libraries, config)?;
    let packager = add_packager_phase(project, app_target, react_path, config)?;
    let removed_objects = remove_libraries_group(project, config);

    project.save().map_err(ConversionError::from_project_save)?;
    info!(path = %project.path().display(), "Saved project");

    Ok(MutationReport {
        removed_libraries,
        packager,
        removed_objects,
    })
}

/// Location of the React project: the group's entry, or the fixed fallback
pub fn react_project_path(
    classified: Option<&PathBuf>,
    root: &Path,
    config: &ConverterConfig,
) -> PathBuf {
    classified
        .cloned()
        .unwrap_or_else(|| root.join(&config.react_project_path))
}

/// Opens a project, mapping failures to conversion errors
pub fn open_project(path: &Path) -> Result<XcodeProject, ConversionError> {
    XcodeProject::open(path).map_err(ConversionError::from_project_load)
}
