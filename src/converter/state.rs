//! Resumable run state
//!
//! A conversion that fails partway leaves a record at `ios/.react-pod-state.json`
//! naming the last completed step. The next `convert` picks up after it instead
//! of refusing because the Podfile already exists. The record is deleted once
//! pods are installed.

use crate::error::ConversionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Conversion steps, in order. Each variant means that step has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Unlinked,
    GroupRemoved,
    ConfigWritten,
    Linked,
    Installed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::NotStarted => "not started",
            RunState::Unlinked => "dependencies unlinked",
            RunState::GroupRemoved => "Libraries group removed",
            RunState::ConfigWritten => "Podfile written",
            RunState::Linked => "dependencies linked",
            RunState::Installed => "pods installed",
        };
        f.write_str(name)
    }
}

/// Persisted progress of a conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub state: RunState,
    pub app_name: String,
    /// Dependencies found before the Libraries group was removed
    pub dependencies: Vec<String>,
    /// Library names whose static links are removed
    #[serde(default)]
    pub libraries: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl RunRecord {
    pub fn new(app_name: impl Into<String>, dependencies: Vec<String>, libraries: Vec<String>) -> Self {
        Self {
            state: RunState::NotStarted,
            app_name: app_name.into(),
            dependencies,
            libraries,
            updated_at: Utc::now(),
        }
    }

    /// Reads the record at `path`, `None` when there is no interrupted run
    pub fn load(path: &Path) -> Result<Option<Self>, ConversionError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(run_state_error(path, err)),
        };
        let record = serde_json::from_str(&contents).map_err(|e| run_state_error(path, e))?;
        Ok(Some(record))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConversionError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| run_state_error(path, e))?;
        fs::write(path, json + "\n").map_err(|source| ConversionError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Marks `state` complete and persists the record
    pub fn advance(&mut self, state: RunState, path: &Path) -> Result<(), ConversionError> {
        debug!(%state, "Step complete");
        self.state = state;
        self.updated_at = Utc::now();
        self.save(path)
    }

    /// Deletes the record at `path` if present
    pub fn clear(path: &Path) -> Result<(), ConversionError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(run_state_error(path, err)),
        }
    }
}

fn run_state_error(path: &Path, err: impl fmt::Display) -> ConversionError {
    ConversionError::RunState {
        path: PathBuf::from(path),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_states_are_ordered() {
        assert!(RunState::NotStarted < RunState::Unlinked);
        assert!(RunState::GroupRemoved < RunState::ConfigWritten);
        assert!(RunState::Linked < RunState::Installed);
    }

    #[test]
    fn test_missing_record() {
        let temp = TempDir::new().unwrap();
        assert!(RunRecord::load(&temp.path().join("state.json")).unwrap().is_none());
    }

    #[test]
    fn test_advance_persists() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        let mut record = RunRecord::new("SampleApp", vec!["MyCustomDep".into()], vec![]);

        record.advance(RunState::GroupRemoved, &path).unwrap();

        let loaded = RunRecord::load(&path).unwrap().unwrap();
        assert_eq!(loaded.state, RunState::GroupRemoved);
        assert_eq!(loaded.dependencies, vec!["MyCustomDep"]);
        assert!(fs::read_to_string(&path).unwrap().contains("\"group_removed\""));
    }

    #[test]
    fn test_libraries_default_when_absent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        fs::write(
            &path,
            r#"{"state":"unlinked","app_name":"A","dependencies":[],"updated_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        let record = RunRecord::load(&path).unwrap().unwrap();
        assert_eq!(record.state, RunState::Unlinked);
        assert!(record.libraries.is_empty());
    }

    #[test]
    fn test_corrupt_record() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        fs::write(&path, "{").unwrap();
        assert!(matches!(
            RunRecord::load(&path),
            Err(ConversionError::RunState { .. })
        ));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        RunRecord::new("A", vec![], vec![]).save(&path).unwrap();

        RunRecord::clear(&path).unwrap();
        RunRecord::clear(&path).unwrap();
        assert!(!path.exists());
    }
}
