//! Conversion from the Libraries group to a CocoaPods Podfile
//!
//! [`Converter::convert`] runs the whole migration:
//!
//! 1. Preflight: required commands, clean working tree, node modules, environment report
//! 2. `package.json` and `ios/<app>.xcodeproj`
//! 3. Libraries group classification
//! 4. `react-native unlink` per dependency
//! 5. Project mutation and save
//! 6. Podfile generation
//! 7. `react-native link` per dependency
//! 8. `pod install`
//!
//! Progress after step 4 is recorded in a [`RunRecord`] so a failed run can be
//! resumed. [`Converter::update`] refreshes the packager build phase of an
//! already converted project.

pub mod classifier;
pub mod installer;
pub mod linker;
pub mod mutator;
pub mod podfile;
pub mod preflight;
pub mod state;

pub use classifier::{classify, Classification};
pub use installer::SetupOutcome;
pub use mutator::{MutationReport, PackagerOutcome};
pub use preflight::{EnvironmentReport, ToolReport};
pub use state::{RunRecord, RunState};

use crate::config::ConverterConfig;
use crate::error::{ConversionError, Result};
use crate::manifest::PackageManifest;
use crate::runner::{CommandRunner, CommandSpec};
use crate::xcode::{Target, XcodeProject};
use linker::LinkAction;
use podfile::PodfileContext;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const IOS_DIR: &str = "ios";
const REACT_PATH_FROM_IOS: &str = "../node_modules";

/// How a conversion ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertOutcome {
    /// No Libraries group; the project is already converted
    NothingToDo,
    Converted {
        dependencies: Vec<String>,
        /// Picked up from a previous, interrupted run
        resumed: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate,
    Updated,
    /// The app target has no packager phase; nothing was changed
    PhaseMissing,
}

/// State shared by the steps of one run
struct Session {
    app_name: String,
    project: XcodeProject,
    app_target: Target,
    test_target: Option<Target>,
}

pub struct Converter<R: CommandRunner> {
    config: ConverterConfig,
    runner: R,
    root: PathBuf,
}

impl<R: CommandRunner> Converter<R> {
    /// `root` is the React Native repository, the directory holding `package.json`
    pub fn new(config: ConverterConfig, runner: R, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            runner,
            root: root.into(),
        }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    fn ios_dir(&self) -> PathBuf {
        self.root.join(IOS_DIR)
    }

    fn podfile_path(&self) -> PathBuf {
        self.root.join(&self.config.podfile_path)
    }

    fn state_path(&self) -> PathBuf {
        self.root.join(&self.config.state_path)
    }

    fn project_path(&self, app_name: &str) -> PathBuf {
        self.ios_dir().join(format!("{}.xcodeproj", app_name))
    }

    /// Converts the app to build React and its native dependencies from a Podfile
    ///
    /// # Errors
    ///
    /// [`ConversionError::AlreadyConverted`] when `ios/Podfile` exists and no
    /// interrupted run is recorded; any preflight, project or command failure
    /// otherwise.
    pub fn convert(&self) -> Result<ConvertOutcome> {
        self.config.validate().map_err(ConversionError::from)?;

        let podfile_path = self.podfile_path();
        let record = RunRecord::load(&self.state_path())?;
        if record.is_none() && podfile_path.exists() {
            info!("A future release may support integration with an existing Podfile.");
            info!("This release can only convert apps that do not currently use a Podfile.");
            return Err(ConversionError::AlreadyConverted(podfile_path).into());
        }

        let session = self.startup(record.is_none())?;

        let classification = match record {
            Some(record) => {
                if record.app_name != session.app_name {
                    return Err(ConversionError::RunState {
                        path: self.state_path(),
                        message: format!(
                            "recorded for app {} but package.json names {}; delete it to start over",
                            record.app_name, session.app_name
                        ),
                    }
                    .into());
                }
                info!(state = %record.state, "Resuming interrupted conversion");
                return self.run_from(record, &session, true);
            }
            None => match classify(&session.project, &self.config) {
                Some(classification) => classification,
                None => {
                    info!(
                        "Libraries group not found in {}. No conversion necessary.",
                        session.project.path().display()
                    );
                    return Ok(ConvertOutcome::NothingToDo);
                }
            },
        };

        if classification.is_empty() {
            info!("No third-party dependencies in the {} group", self.config.libraries_group);
        } else {
            info!("Dependencies:");
            for dependency in &classification.dependencies {
                info!(" {}", dependency);
            }
        }
        let record = RunRecord::new(
            session.app_name.clone(),
            classification.dependencies,
            classification.libraries,
        );
        self.run_from(record, &session, false)
    }

    /// Runs every step the record has not completed yet
    fn run_from(
        &self,
        mut record: RunRecord,
        session: &Session,
        resumed: bool,
    ) -> Result<ConvertOutcome> {
        let state_path = self.state_path();

        if record.state < RunState::Unlinked {
            linker::run_all(&self.runner, LinkAction::Unlink, &record.dependencies, &self.root)?;
            record.advance(RunState::Unlinked, &state_path)?;
        }

        if record.state < RunState::GroupRemoved {
            self.mutate_project(&record, session)?;
            record.advance(RunState::GroupRemoved, &state_path)?;
        }

        if record.state < RunState::ConfigWritten {
            let context = PodfileContext {
                app_name: session.app_name.clone(),
                react_path: format!("{}/{}", REACT_PATH_FROM_IOS, self.config.react_package),
                dependencies: record.dependencies.clone(),
                test_target: session.test_target.as_ref().map(|t| t.name.clone()),
            };
            podfile::generate(&self.podfile_path(), &context)?;
            record.advance(RunState::ConfigWritten, &state_path)?;
        }

        if record.state < RunState::Linked {
            linker::run_all(&self.runner, LinkAction::Link, &record.dependencies, &self.root)?;
            record.advance(RunState::Linked, &state_path)?;
        }

        if record.state < RunState::Installed {
            info!(
                "Generating Pods project and {}/{}.xcworkspace",
                IOS_DIR, session.app_name
            );
            info!("Once pod install is complete, your project will be part of this workspace.");
            info!("From now on, you should build the workspace with Xcode instead of the project.");
            info!("Always add the workspace and Podfile.lock to SCM.");
            installer::install(&self.runner, &self.ios_dir(), &self.config)?;
        }

        RunRecord::clear(&state_path)?;
        info!("Conversion complete");

        self.open_workspace(&session.app_name);

        Ok(ConvertOutcome::Converted {
            dependencies: record.dependencies,
            resumed,
        })
    }

    /// Reloads the project after unlinking and applies every edit
    fn mutate_project(&self, record: &RunRecord, session: &Session) -> Result<MutationReport> {
        let mut project = mutator::open_project(session.project.path())?;
        let (app_target, _) = validate_app_target(&project, &session.app_name)?;

        let react_project = classify(&project, &self.config).and_then(|c| c.react_project);
        let react_path = mutator::react_project_path(react_project.as_ref(), &self.root, &self.config);
        debug!(path = %react_path.display(), "React project");

        let report = mutator::apply(
            &mut project,
            &app_target,
            &record.libraries,
            &react_path,
            &self.config,
        )?;
        info!(
            libraries = report.removed_libraries.len(),
            objects = report.removed_objects,
            "Removed {} group",
            self.config.libraries_group
        );
        Ok(report)
    }

    fn open_workspace(&self, app_name: &str) {
        let workspace = Path::new(IOS_DIR).join(format!("{}.xcworkspace", app_name));
        let spec = CommandSpec::new("open")
            .arg(workspace.to_string_lossy())
            .current_dir(&self.root);
        match self.runner.capture(&spec) {
            Ok(output) if output.success() => {}
            Ok(output) => warn!(status = ?output.status, "Could not open {}", workspace.display()),
            Err(err) => warn!(error = %err, "Could not open {}", workspace.display()),
        }
    }

    /// Refreshes the packager build phase from the React project in `node_modules`
    ///
    /// # Errors
    ///
    /// [`ConversionError::ConversionRequired`] when the project still has a
    /// Libraries group or no Podfile.
    pub fn update(&self) -> Result<UpdateOutcome> {
        self.config.validate().map_err(ConversionError::from)?;
        let mut session = self.startup(true)?;
        let project = &mut session.project;

        if project.find_group(&self.config.libraries_group).is_some() {
            return Err(ConversionError::ConversionRequired(format!(
                "{} group present in {}",
                self.config.libraries_group,
                project.path().display()
            ))
            .into());
        }
        if !self.podfile_path().exists() {
            return Err(ConversionError::ConversionRequired(format!(
                "{} not found",
                self.config.podfile_path.display()
            ))
            .into());
        }

        info!("Updating project at {}", project.path().display());
        let react = mutator::open_project(&self.root.join(&self.config.react_project_path))?;
        let pattern = self
            .config
            .packager_phase_regex()
            .map_err(ConversionError::from)?;

        let Some((phase_id, current)) =
            mutator::find_packager_phase(project, &session.app_target.id, &pattern)
        else {
            info!(
                "Packager build phase not found in {}. Not updating.",
                project.path().display()
            );
            return Ok(UpdateOutcome::PhaseMissing);
        };

        let source = mutator::source_packager_phase(&react, &pattern)?;
        let script = mutator::rewrite_script(&source.script, &self.config.packager_scripts_path());

        if script == current.script && source.name == current.name {
            info!("{} build phase up to date.", current.name);
            return Ok(UpdateOutcome::UpToDate);
        }

        info!("Updating packager phase.");
        info!(" Current name: {}", current.name);
        info!(" New name    : {}", source.name);
        project.update_shell_script_phase(&phase_id, &source.name, &script);
        project.save().map_err(ConversionError::from_project_save)?;

        info!("Updated {}", project.path().display());
        Ok(UpdateOutcome::Updated)
    }

    /// Preflight checks, then the manifest and project
    fn startup(&self, check_repo: bool) -> Result<Session> {
        preflight::validate_commands(&self.runner, preflight::REQUIRED_COMMANDS)?;
        if check_repo {
            preflight::check_repo_status(&self.runner, &self.root)?;
        }

        preflight::install_node_modules_if_needed(&self.runner, &self.root)?;
        EnvironmentReport::collect(&self.runner, &self.config).log();

        preflight::check_platform(&self.config)?;

        let manifest = PackageManifest::load(&self.root)?;
        let app_name = manifest.app_name().to_string();
        info!("package.json:");
        info!(" app name: {:?}", app_name);
        match manifest.dependency(&self.config.react_package) {
            Some(version) => debug!(version, "{} dependency", self.config.react_package),
            None => warn!("{} is not a dependency in package.json", self.config.react_package),
        }

        let project = mutator::open_project(&self.project_path(&app_name))?;
        info!("Found Xcode project at {}", project.path().display());

        let (app_target, test_target) = validate_app_target(&project, &app_name)?;
        Ok(Session {
            app_name,
            project,
            app_target,
            test_target,
        })
    }
}

/// The single application target named `app_name`, and the first unit-test target
pub fn validate_app_target(
    project: &XcodeProject,
    app_name: &str,
) -> std::result::Result<(Target, Option<Target>), ConversionError> {
    let targets = project.targets();
    let invalid = |reason: String| ConversionError::InvalidProject {
        path: project.path().to_path_buf(),
        reason,
    };

    let named: Vec<&Target> = targets.iter().filter(|t| t.name == app_name).collect();
    let app_target = match named.as_slice() {
        [] => return Err(invalid(format!("no target named {}", app_name))),
        [target] if target.is_application() => (*target).clone(),
        [_] => return Err(invalid(format!("target {} is not an application", app_name))),
        _ => return Err(invalid(format!("{} targets named {}", named.len(), app_name))),
    };

    let test_target = targets.iter().find(|t| t.is_unit_test()).cloned();
    Ok((app_target, test_target))
}
