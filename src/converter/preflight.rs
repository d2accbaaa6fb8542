//! Checks that run before a conversion or update touches anything

use crate::config::ConverterConfig;
use crate::error::{ConversionError, Error, Result};
use crate::runner::{temp_log, CommandRunner, CommandSpec};
use anyhow::{bail, Context};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A program the conversion shells out to, with the package providing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredCommand {
    pub program: &'static str,
    pub package: &'static str,
}

pub const REQUIRED_COMMANDS: &[RequiredCommand] = &[
    RequiredCommand {
        program: "yarn",
        package: "yarn",
    },
    RequiredCommand {
        program: "react-native",
        package: "react-native-cli",
    },
    RequiredCommand {
        program: "pod",
        package: "cocoapods",
    },
];

/// Fails with [`Error::CommandNotFound`] for the first program not on `PATH`
pub fn validate_commands<R: CommandRunner>(runner: &R, commands: &[RequiredCommand]) -> Result<()> {
    for command in commands {
        match runner.which(command.program) {
            Some(path) => debug!(program = command.program, path = %path.display(), "Found command"),
            None => return Err(Error::CommandNotFound(command.program.to_string())),
        }
    }
    Ok(())
}

/// Refuses to run with uncommitted changes. Skipped without git or outside a repository.
pub fn check_repo_status<R: CommandRunner>(runner: &R, root: &Path) -> Result<()> {
    if runner.which("git").is_none() {
        debug!("git not installed; skipping repository check");
        return Ok(());
    }

    let git_dir = runner.capture(&CommandSpec::new("git").args(["rev-parse", "--git-dir"]).current_dir(root))?;
    if !git_dir.success() {
        debug!("Not a git repository; skipping repository check");
        return Ok(());
    }

    let diff = runner.capture(
        &CommandSpec::new("git")
            .args(["diff-index", "--quiet", "HEAD", "--"])
            .current_dir(root),
    )?;
    if diff.success() {
        Ok(())
    } else {
        Err(ConversionError::UncommittedChanges.into())
    }
}

/// Runs `yarn install` unless both yarn checks pass. Returns whether it installed.
pub fn install_node_modules_if_needed<R: CommandRunner>(runner: &R, root: &Path) -> Result<bool> {
    for check in ["--integrity", "--verify-tree"] {
        let spec = CommandSpec::new("yarn").args(["check", check]).current_dir(root);
        if !runner.capture(&spec)?.success() {
            info!("Installing node modules");
            runner.run(
                &CommandSpec::new("yarn")
                    .arg("install")
                    .current_dir(root)
                    .log(temp_log("yarn")),
            )?;
            return Ok(true);
        }
    }
    Ok(false)
}

/// Conversion only makes sense where Xcode and CocoaPods run
pub fn check_platform(config: &ConverterConfig) -> std::result::Result<(), ConversionError> {
    if config.require_macos && !cfg!(target_os = "macos") {
        return Err(ConversionError::MacOsRequired);
    }
    Ok(())
}

/// Outcome of probing one tool for the environment report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolReport {
    Found {
        path: PathBuf,
        version: Option<String>,
    },
    Missing,
    /// On `PATH`, but the version query failed
    Unavailable(String),
}

fn version_of<R: CommandRunner>(runner: &R, program: &str) -> anyhow::Result<String> {
    let output = runner
        .capture(&CommandSpec::new(program).arg("--version"))
        .with_context(|| format!("running {} --version", program))?;
    if !output.success() {
        bail!("{} --version exited with {:?}", program, output.status);
    }
    Ok(output.stdout.trim_end().to_string())
}

/// Locates `program` and, when asked, its version
pub fn inspect_tool<R: CommandRunner>(
    runner: &R,
    program: &str,
    include_version: bool,
) -> ToolReport {
    let Some(path) = runner.which(program) else {
        return ToolReport::Missing;
    };
    if !include_version {
        return ToolReport::Found { path, version: None };
    }
    match version_of(runner, program) {
        Ok(version) => ToolReport::Found {
            path,
            version: Some(version),
        },
        Err(err) => ToolReport::Unavailable(format!("{:#}", err)),
    }
}

/// Diagnostic banner printed at the start of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentReport {
    pub installed_from_homebrew: bool,
    /// `uname -msr`, when available
    pub system: Option<String>,
    /// `(package, report)` per required command
    pub tools: Vec<(&'static str, ToolReport)>,
    /// `react-native --version` output, one entry per line
    pub react_native_info: Vec<String>,
}

impl EnvironmentReport {
    /// Inspects the environment. Never fails.
    pub fn collect<R: CommandRunner>(runner: &R, config: &ConverterConfig) -> Self {
        let system = runner
            .capture(&CommandSpec::new("uname").arg("-msr"))
            .ok()
            .filter(|output| output.success())
            .map(|output| output.stdout.trim_end().to_string());

        let mut tools = Vec::new();
        let mut react_native_info = Vec::new();
        for command in REQUIRED_COMMANDS {
            let is_react_native = command.program == "react-native";
            let report = inspect_tool(runner, command.program, !is_react_native);
            if is_react_native && matches!(report, ToolReport::Found { .. }) {
                match version_of(runner, command.program) {
                    Ok(info) => react_native_info = info.lines().map(str::to_string).collect(),
                    Err(err) => debug!(error = %format!("{:#}", err), "react-native version unavailable"),
                }
            }
            tools.push((command.package, report));
        }

        Self {
            installed_from_homebrew: config.installed_from_homebrew,
            system,
            tools,
            react_native_info,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("{} v{}", crate::NAME, crate::VERSION)];
        if self.installed_from_homebrew {
            lines.push(" Installed from Homebrew".to_string());
        }
        if let Some(system) = &self.system {
            lines.push(format!(" {}", system));
        }
        for (package, report) in &self.tools {
            lines.push(match report {
                ToolReport::Found {
                    path,
                    version: Some(version),
                } => format!(" {} {}: {}", package, version, path.display()),
                ToolReport::Found { path, version: None } => {
                    format!(" {}: {}", package, path.display())
                }
                ToolReport::Missing => format!(" {}: not found", package),
                ToolReport::Unavailable(reason) => format!(" {}: {}", package, reason),
            });
            if *package == "react-native-cli" {
                lines.extend(self.react_native_info.iter().map(|l| format!("  {}", l)));
            }
        }
        lines
    }

    pub fn log(&self) {
        for line in self.lines() {
            info!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandOutput, MockRunner};

    #[test]
    fn test_validate_commands_names_missing_program() {
        let runner = MockRunner::new().with_missing("pod");
        let err = validate_commands(&runner, REQUIRED_COMMANDS).unwrap_err();
        assert!(matches!(err, Error::CommandNotFound(ref p) if p == "pod"));
        assert!(validate_commands(&MockRunner::new(), REQUIRED_COMMANDS).is_ok());
    }

    #[test]
    fn test_repo_check_without_git() {
        let runner = MockRunner::new().with_missing("git");
        check_repo_status(&runner, Path::new("/repo")).unwrap();
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_repo_check_outside_repository() {
        let runner = MockRunner::new();
        runner.fail("git rev-parse", 128);
        check_repo_status(&runner, Path::new("/repo")).unwrap();
        assert_eq!(runner.calls(), vec!["git rev-parse --git-dir"]);
    }

    #[test]
    fn test_repo_check_dirty_tree() {
        let runner = MockRunner::new();
        runner.fail("git diff-index", 1);
        let err = check_repo_status(&runner, Path::new("/repo")).unwrap_err();
        assert!(matches!(
            err,
            Error::Conversion(ConversionError::UncommittedChanges)
        ));
    }

    #[test]
    fn test_yarn_checks_pass() {
        let runner = MockRunner::new();
        assert!(!install_node_modules_if_needed(&runner, Path::new("/repo")).unwrap());
        assert_eq!(
            runner.calls(),
            vec!["yarn check --integrity", "yarn check --verify-tree"]
        );
    }

    #[test]
    fn test_failed_yarn_check_installs() {
        let runner = MockRunner::new();
        runner.fail("yarn check --integrity", 1);
        assert!(install_node_modules_if_needed(&runner, Path::new("/repo")).unwrap());
        assert_eq!(runner.calls(), vec!["yarn check --integrity", "yarn install"]);
        assert!(runner.specs()[1].log.as_ref().unwrap().ends_with("yarn.log"));
    }

    #[test]
    fn test_platform_check_can_be_disabled() {
        let mut config = ConverterConfig::default();
        config.require_macos = false;
        assert!(check_platform(&config).is_ok());
    }

    #[test]
    fn test_inspect_tool_outcomes() {
        let runner = MockRunner::new().with_missing("yarn");
        runner.respond("pod --version", CommandOutput::ok("1.5.3\n"));
        runner.fail("react-native --version", 1);

        assert_eq!(inspect_tool(&runner, "yarn", true), ToolReport::Missing);
        assert_eq!(
            inspect_tool(&runner, "pod", true),
            ToolReport::Found {
                path: PathBuf::from("/usr/local/bin/pod"),
                version: Some("1.5.3".to_string())
            }
        );
        assert!(matches!(
            inspect_tool(&runner, "react-native", true),
            ToolReport::Unavailable(_)
        ));
    }

    #[test]
    fn test_environment_report_lines() {
        let runner = MockRunner::new();
        runner.respond("uname -msr", CommandOutput::ok("Darwin 17.7.0 x86_64\n"));
        runner.respond(
            "react-native --version",
            CommandOutput::ok("react-native-cli: 2.0.1\nreact-native: 0.57.4\n"),
        );
        runner.respond("yarn --version", CommandOutput::ok("1.12.1\n"));
        runner.respond("pod --version", CommandOutput::ok("1.5.3\n"));
        let mut config = ConverterConfig::default();
        config.installed_from_homebrew = true;

        let lines = EnvironmentReport::collect(&runner, &config).lines();
        assert_eq!(
            lines[1..],
            [
                " Installed from Homebrew",
                " Darwin 17.7.0 x86_64",
                " yarn 1.12.1: /usr/local/bin/yarn",
                " react-native-cli: /usr/local/bin/react-native",
                "  react-native-cli: 2.0.1",
                "  react-native: 0.57.4",
                " cocoapods 1.5.3: /usr/local/bin/pod",
            ]
        );
    }
}
