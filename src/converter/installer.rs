//! CocoaPods setup and installation

use crate::config::ConverterConfig;
use crate::error::{Error, Result};
use crate::runner::{temp_log, CommandRunner, CommandSpec};
use std::path::Path;
use tracing::{info, warn};

const POD: &str = "pod";

/// Result of the `pod setup` step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    /// The master spec repo was already present
    AlreadySetUp,
    SetUp,
    /// `pod setup` failed; `pod install` has to update the repo itself
    Failed(String),
}

/// Runs `pod setup` when the master spec repo is missing. Failures are not fatal.
pub fn setup_if_needed<R: CommandRunner>(
    runner: &R,
    config: &ConverterConfig,
) -> Result<SetupOutcome> {
    if config
        .cocoapods_repo_dir
        .as_deref()
        .is_some_and(Path::exists)
    {
        return Ok(SetupOutcome::AlreadySetUp);
    }

    info!("Setting up CocoaPods");
    let spec = CommandSpec::new(POD).arg("setup").log(temp_log("pod-setup"));
    match runner.run(&spec) {
        Ok(()) => Ok(SetupOutcome::SetUp),
        Err(Error::Execution(err)) => {
            warn!(error = %err, "pod setup failed; pod install will update the spec repo");
            Ok(SetupOutcome::Failed(err.to_string()))
        }
        Err(err) => Err(err),
    }
}

/// `pod install`, run from `ios_dir`
pub fn install_command(ios_dir: &Path, repo_update: bool) -> CommandSpec {
    let spec = CommandSpec::new(POD).arg("install");
    let spec = if repo_update {
        spec.arg("--repo-update")
    } else {
        spec
    };
    spec.current_dir(ios_dir).log(temp_log("pod-install"))
}

/// Sets up CocoaPods if needed, then installs pods
pub fn install<R: CommandRunner>(
    runner: &R,
    ios_dir: &Path,
    config: &ConverterConfig,
) -> Result<SetupOutcome> {
    let setup = setup_if_needed(runner, config)?;
    let repo_update = config.repo_update || matches!(setup, SetupOutcome::Failed(_));

    info!(repo_update, "Installing pods");
    runner.run(&install_command(ios_dir, repo_update))?;
    Ok(setup)
}
