//! Error types shared across the conversion pipeline
//!
//! Every fatal condition is raised once as one of these types and carried to
//! `main` with `?`, where it is printed and mapped to exit status 1.

use crate::config::ConfigError;
use crate::xcode::ProjectError;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Conditions that stop a conversion or update
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Failed to load {}. File not found. Please run from the project root.", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("Failed to parse package.json: {0}")]
    ManifestParse(String),

    #[error("Failed to open {}. File not found.", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("Failed to load {}: {message}", .path.display())]
    ProjectLoad { path: PathBuf, message: String },

    #[error("Invalid project {}: {reason}", .path.display())]
    InvalidProject { path: PathBuf, reason: String },

    #[error("Podfile already present at {}.", .0.display())]
    AlreadyConverted(PathBuf),

    #[error("{0}. Conversion necessary. Run react-pod convert first.")]
    ConversionRequired(String),

    #[error("Packager build phase not found in {}.", .0.display())]
    PackagerPhaseNotFound(PathBuf),

    #[error("Uncommitted changes in repo. Please commit or stash before continuing.")]
    UncommittedChanges,

    #[error("macOS required.")]
    MacOsRequired,

    #[error("Podfile template error: {0}")]
    Template(String),

    #[error("Failed to save {}: {message}", .path.display())]
    Save { path: PathBuf, message: String },

    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Run state {}: {message}", .path.display())]
    RunState { path: PathBuf, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ConversionError {
    /// Maps a project loading failure, keeping "not found" distinct
    pub fn from_project_load(err: ProjectError) -> Self {
        match err {
            ProjectError::NotFound(path) => ConversionError::ProjectNotFound(path),
            ProjectError::Read { path, source } => ConversionError::ProjectLoad {
                path,
                message: source.to_string(),
            },
            ProjectError::Parse { path, source } => ConversionError::ProjectLoad {
                path,
                message: source.to_string(),
            },
            ProjectError::Malformed { path, reason } => ConversionError::ProjectLoad {
                path,
                message: reason,
            },
            ProjectError::Write { path, source } => ConversionError::Save {
                path,
                message: source.to_string(),
            },
        }
    }

    pub fn from_project_save(err: ProjectError) -> Self {
        let message = err.to_string();
        let path = match err {
            ProjectError::NotFound(path)
            | ProjectError::Read { path, .. }
            | ProjectError::Write { path, .. }
            | ProjectError::Parse { path, .. }
            | ProjectError::Malformed { path, .. } => path,
        };
        ConversionError::Save { path, message }
    }
}

/// An external command exited unsuccessfully
#[derive(Debug, Error)]
#[error("{command} failed ({status_text}). See {} for details.", .log.display())]
pub struct ExecutionError {
    pub command: String,
    pub status: Option<i32>,
    pub log: PathBuf,
    status_text: String,
}

impl ExecutionError {
    pub fn new(command: impl Into<String>, status: ExitStatus, log: impl Into<PathBuf>) -> Self {
        Self::with_code(command, status.code(), log)
    }

    pub fn with_code(command: impl Into<String>, status: Option<i32>, log: impl Into<PathBuf>) -> Self {
        let status_text = match status {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        };
        Self {
            command: command.into(),
            status,
            log: log.into(),
            status_text,
        }
    }
}

/// Top-level error returned by [`crate::Converter`] operations
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_message() {
        let err = ExecutionError::with_code("pod install", Some(1), "/tmp/pod-install.log");
        assert_eq!(
            err.to_string(),
            "pod install failed (exit status 1). See /tmp/pod-install.log for details."
        );
        assert_eq!(err.status, Some(1));
    }

    #[test]
    fn test_execution_error_without_code() {
        let err = ExecutionError::with_code("yarn install", None, "/tmp/yarn.log");
        assert!(err.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_project_not_found_maps_to_conversion_error() {
        let err = ConversionError::from_project_load(ProjectError::NotFound(PathBuf::from(
            "/repo/ios/App.xcodeproj",
        )));
        assert!(matches!(err, ConversionError::ProjectNotFound(_)));
        assert_eq!(
            err.to_string(),
            "Failed to open /repo/ios/App.xcodeproj. File not found."
        );
    }

    #[test]
    fn test_conversion_error_wraps_transparently() {
        let err: Error = ConversionError::MacOsRequired.into();
        assert_eq!(err.to_string(), "macOS required.");
    }
}
