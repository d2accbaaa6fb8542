//! Configuration management for react-pod
//!
//! [`ConverterConfig`] collects every default and pattern the conversion relies
//! on. `Default` reads `REACT_POD_*` environment variables and falls back to the
//! constants below; tests and callers override individual fields directly.
//!
//! # Environment Variables
//!
//! - `REACT_POD_REPO_UPDATE`: pass `--repo-update` to `pod install` (true|false) - default: "true"
//! - `REACT_POD_INSTALLED_FROM_HOMEBREW`: report a Homebrew install in the environment banner
//! - `REACT_POD_LOG_LEVEL`: logging level - default: "info"
//! - `REACT_POD_LOG_JSON`: JSON log output (true|false) - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use react_pod::ConverterConfig;
//!
//! let mut config = ConverterConfig::default();
//! config.repo_update = false;
//! config.validate().expect("Invalid configuration");
//! ```

use regex::Regex;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const REPO_UPDATE_ENV: &str = "REACT_POD_REPO_UPDATE";
pub const HOMEBREW_ENV: &str = "REACT_POD_INSTALLED_FROM_HOMEBREW";

/// Default values for configuration
const DEFAULT_REPO_UPDATE: bool = true;
const DEFAULT_LIBRARIES_GROUP: &str = "Libraries";
const DEFAULT_SECONDARY_TARGET_PATTERN: &str = "-tvOS$";
const DEFAULT_STATIC_LIBRARY_PATTERN: &str = r"^lib(.+)\.a$";
const DEFAULT_REACT_PROJECT_MARKER: &str = "React.xcodeproj";
const DEFAULT_REACT_PROJECT_PATH: &str = "node_modules/react-native/React/React.xcodeproj";
const DEFAULT_REACT_PACKAGE: &str = "react-native";
const DEFAULT_PACKAGER_PHASE_PATTERN: &str = "(?i)packager";
const DEFAULT_PACKAGER_PHASE_NAME: &str = "Start Packager";
const DEFAULT_PODFILE_PATH: &str = "ios/Podfile";
const DEFAULT_STATE_PATH: &str = "ios/.react-pod-state.json";

/// Sub-projects React Native adds to every new app's Libraries group
pub const DEFAULT_MODULES: &[&str] = &[
    "ART",
    "RCTActionSheet",
    "RCTAnimation",
    "RCTBlob",
    "RCTCameraRoll",
    "RCTGeolocation",
    "RCTImage",
    "RCTLinking",
    "RCTNetwork",
    "RCTPushNotification",
    "RCTSettings",
    "RCTTest",
    "RCTText",
    "RCTVibration",
    "RCTWebSocket",
    "React",
];

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A pattern field is not a valid regular expression
    #[error("Invalid {field} pattern: {error}")]
    InvalidPattern { field: &'static str, error: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Settings for a conversion or update run
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Pass `--repo-update` to `pod install`
    pub repo_update: bool,

    /// Libraries group entries that ship with React Native itself
    pub default_modules: Vec<String>,

    /// Title of the group holding the static-library sub-projects
    pub libraries_group: String,

    /// Targets matching this pattern keep their static-library linkage
    pub secondary_target_pattern: String,

    /// Matches a static library file name, capturing the library name
    pub static_library_pattern: String,

    /// Substring identifying the React sub-project among the group's children
    pub react_project_marker: String,

    /// React project location relative to the repository root, used when the
    /// group has no React entry and by update mode
    pub react_project_path: PathBuf,

    /// npm package providing React Native
    pub react_package: String,

    /// Matches the packager build phase name in the React project
    pub packager_phase_pattern: String,

    /// Name given to the generated build phase
    pub packager_phase_name: String,

    /// Podfile location relative to the repository root
    pub podfile_path: PathBuf,

    /// Run state location relative to the repository root
    pub state_path: PathBuf,

    /// Refuse to convert on anything but macOS
    pub require_macos: bool,

    /// Master spec repo; `pod setup` runs first when it is missing
    pub cocoapods_repo_dir: Option<PathBuf>,

    /// Whether the binary came from a Homebrew formula
    pub installed_from_homebrew: bool,
}

impl Default for ConverterConfig {
    /// Creates a configuration from `REACT_POD_*` environment variables with defaults
    fn default() -> Self {
        let repo_update = env::var(REPO_UPDATE_ENV)
            .ok()
            .and_then(|v| parse_bool(&v))
            .unwrap_or(DEFAULT_REPO_UPDATE);

        let installed_from_homebrew = env::var_os(HOMEBREW_ENV).is_some();

        let cocoapods_repo_dir =
            dirs::home_dir().map(|home| home.join(".cocoapods").join("repos").join("master"));

        Self {
            repo_update,
            default_modules: DEFAULT_MODULES.iter().map(|m| m.to_string()).collect(),
            libraries_group: DEFAULT_LIBRARIES_GROUP.to_string(),
            secondary_target_pattern: DEFAULT_SECONDARY_TARGET_PATTERN.to_string(),
            static_library_pattern: DEFAULT_STATIC_LIBRARY_PATTERN.to_string(),
            react_project_marker: DEFAULT_REACT_PROJECT_MARKER.to_string(),
            react_project_path: PathBuf::from(DEFAULT_REACT_PROJECT_PATH),
            react_package: DEFAULT_REACT_PACKAGE.to_string(),
            packager_phase_pattern: DEFAULT_PACKAGER_PHASE_PATTERN.to_string(),
            packager_phase_name: DEFAULT_PACKAGER_PHASE_NAME.to_string(),
            podfile_path: PathBuf::from(DEFAULT_PODFILE_PATH),
            state_path: PathBuf::from(DEFAULT_STATE_PATH),
            require_macos: true,
            cocoapods_repo_dir,
            installed_from_homebrew,
        }
    }
}

impl ConverterConfig {
    /// Overrides the repo-update default with an explicit choice
    pub fn with_repo_update(mut self, repo_update: Option<bool>) -> Self {
        if let Some(repo_update) = repo_update {
            self.repo_update = repo_update;
        }
        self
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a pattern does not compile or a required
    /// name is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.secondary_target_regex()?;
        self.packager_phase_regex()?;
        let static_library = self.static_library_regex()?;
        if static_library.captures_len() < 2 {
            return Err(ConfigError::ValidationFailed(
                "Static library pattern must capture the library name".to_string(),
            ));
        }

        if self.libraries_group.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Libraries group name cannot be empty".to_string(),
            ));
        }
        if self.react_package.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "React package name cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn secondary_target_regex(&self) -> Result<Regex, ConfigError> {
        compile("secondary target", &self.secondary_target_pattern)
    }

    pub fn static_library_regex(&self) -> Result<Regex, ConfigError> {
        compile("static library", &self.static_library_pattern)
    }

    pub fn packager_phase_regex(&self) -> Result<Regex, ConfigError> {
        compile("packager phase", &self.packager_phase_pattern)
    }

    /// Path the packager scripts move to once React is consumed from `node_modules`
    pub fn packager_scripts_path(&self) -> String {
        format!("../node_modules/{}/scripts", self.react_package)
    }
}

impl fmt::Display for ConverterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "react-pod Configuration:")?;
        writeln!(f, "  Repo Update: {}", self.repo_update)?;
        writeln!(f, "  Libraries Group: {}", self.libraries_group)?;
        writeln!(f, "  Default Modules: {}", self.default_modules.len())?;
        writeln!(f, "  Podfile: {}", self.podfile_path.display())?;
        if let Some(ref dir) = self.cocoapods_repo_dir {
            writeln!(f, "  CocoaPods Repo: {}", dir.display())?;
        }
        Ok(())
    }
}

fn compile(field: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
        field,
        error: e.to_string(),
    })
}

/// Parses a boolean environment value
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
