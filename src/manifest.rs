//! `package.json` loading

use crate::error::ConversionError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const MANIFEST_FILE: &str = "package.json";

/// The parts of `package.json` the converter reads
#[derive(Debug, Clone, Deserialize)]
pub struct PackageManifest {
    pub name: String,

    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    #[serde(skip)]
    path: PathBuf,
}

impl PackageManifest {
    /// Reads `package.json` from the repository root
    pub fn load(root: &Path) -> Result<Self, ConversionError> {
        let path = root.join(MANIFEST_FILE);
        let contents = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConversionError::ManifestNotFound(path.clone()),
            _ => ConversionError::ManifestParse(e.to_string()),
        })?;

        let mut manifest = Self::parse(&contents)?;
        manifest.path = path;
        debug!(path = %manifest.path.display(), name = %manifest.name, "Loaded package.json");
        Ok(manifest)
    }

    pub fn parse(contents: &str) -> Result<Self, ConversionError> {
        serde_json::from_str(contents).map_err(|e| ConversionError::ManifestParse(e.to_string()))
    }

    /// Application name, which is also the Xcode project and target name
    pub fn app_name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Version requirement of a dependency, if declared
    pub fn dependency(&self, package: &str) -> Option<&str> {
        self.dependencies.get(package).map(String::as_str)
    }
}
