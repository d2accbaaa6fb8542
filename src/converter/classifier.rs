//! Libraries group classification
//!
//! Each child of the Libraries group is a sub-project reference such as
//! `../node_modules/MyCustomDep/ios/MyCustomDep.xcodeproj`. Children named after
//! a default React Native module are part of React itself; everything else is a
//! third-party dependency named after the grandparent directory of its path.

use crate::config::ConverterConfig;
use crate::xcode::XcodeProject;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PROJECT_SUFFIX: &str = ".xcodeproj";

/// What the Libraries group contains
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub group_id: String,
    /// Path of every child, in group order
    pub paths: Vec<PathBuf>,
    /// Un-suffixed names of the third-party children, matched against `lib<name>.a`
    pub libraries: Vec<String>,
    /// Dependency (npm package) names, deduplicated, in group order
    pub dependencies: Vec<String>,
    /// The React sub-project, when the group references one
    pub react_project: Option<PathBuf>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }
}

/// Classifies the Libraries group, or returns `None` when the project has none
pub fn classify(project: &XcodeProject, config: &ConverterConfig) -> Option<Classification> {
    let group_id = project.find_group(&config.libraries_group)?;

    let mut classification = Classification {
        group_id: group_id.clone(),
        paths: Vec::new(),
        libraries: Vec::new(),
        dependencies: Vec::new(),
        react_project: None,
    };

    for child in project.children(&group_id) {
        let Some(path) = child_path(project, &child) else {
            warn!(id = %child, "Libraries group entry has no path");
            continue;
        };

        if classification.react_project.is_none()
            && path.to_string_lossy().contains(&config.react_project_marker)
        {
            classification.react_project = Some(path.clone());
        }

        let name = library_name(&path);
        let is_default = name
            .as_deref()
            .is_some_and(|n| config.default_modules.iter().any(|m| m == n));

        if !is_default {
            match (name, dependency_name(&path)) {
                (Some(library), Some(dependency)) => {
                    debug!(library = %library, dependency = %dependency, "Third-party library");
                    classification.libraries.push(library);
                    if !classification.dependencies.contains(&dependency) {
                        classification.dependencies.push(dependency);
                    }
                }
                _ => warn!(path = %path.display(), "Cannot derive a dependency name"),
            }
        }

        classification.paths.push(path);
    }

    Some(classification)
}

/// Resolved location of a group child, or its raw `path` when unresolvable
fn child_path(project: &XcodeProject, id: &str) -> Option<PathBuf> {
    project
        .real_path(id)
        .or_else(|| project.string_attr(id, "path").map(PathBuf::from))
}

/// File name without the `.xcodeproj` suffix
pub fn library_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_string_lossy();
    Some(
        file_name
            .strip_suffix(PROJECT_SUFFIX)
            .unwrap_or(&file_name)
            .to_string(),
    )
}

/// Base name of the grandparent directory
pub fn dependency_name(path: &Path) -> Option<String> {
    let grandparent = path.parent()?.parent()?;
    Some(grandparent.file_name()?.to_string_lossy().to_string())
}
