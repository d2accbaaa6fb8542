//! Typed access to an Xcode project bundle
//!
//! [`XcodeProject`] owns the object table of a `project.pbxproj` and exposes the
//! queries and mutations the converter needs. Object ids are handed out as owned
//! `String`s so callers never hold references into the table across a mutation.

use super::plist::{self, Dict, PlistError, Value};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub const APPLICATION_PRODUCT_TYPE: &str = "com.apple.product-type.application";
pub const UNIT_TEST_PRODUCT_TYPE: &str = "com.apple.product-type.bundle.unit-test";

const PBXPROJ_FILE: &str = "project.pbxproj";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse { path: PathBuf, source: PlistError },

    #[error("Malformed project {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
}

/// A snapshot of a native target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub name: String,
    pub product_type: Option<String>,
}

impl Target {
    pub fn is_application(&self) -> bool {
        self.product_type.as_deref() == Some(APPLICATION_PRODUCT_TYPE)
    }

    pub fn is_unit_test(&self) -> bool {
        self.product_type.as_deref() == Some(UNIT_TEST_PRODUCT_TYPE)
    }
}

/// Contents of a shell script build phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellScriptPhase {
    pub name: String,
    pub script: String,
    pub shell_path: String,
    pub input_paths: Vec<String>,
    pub output_paths: Vec<String>,
    pub show_env_vars_in_log: Option<String>,
}

impl ShellScriptPhase {
    pub fn new(name: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: script.into(),
            shell_path: "/bin/sh".to_string(),
            input_paths: Vec::new(),
            output_paths: Vec::new(),
            show_env_vars_in_log: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct XcodeProject {
    path: PathBuf,
    header: Dict,
    objects: Dict,
    root_object: String,
}

impl XcodeProject {
    /// Opens the `.xcodeproj` bundle at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref().to_path_buf();
        let pbxproj = path.join(PBXPROJ_FILE);
        if !path.is_dir() || !pbxproj.is_file() {
            return Err(ProjectError::NotFound(path));
        }

        let contents = fs::read_to_string(&pbxproj).map_err(|source| ProjectError::Read {
            path: pbxproj.clone(),
            source,
        })?;

        let project = Self::from_pbxproj(path, &contents)?;
        debug!(
            path = %project.path.display(),
            objects = project.objects.len(),
            "Opened Xcode project"
        );
        Ok(project)
    }

    /// Builds a project from `project.pbxproj` text. `path` is the bundle location.
    pub fn from_pbxproj(path: impl Into<PathBuf>, contents: &str) -> Result<Self, ProjectError> {
        let path = path.into();
        let malformed = |reason: &str| ProjectError::Malformed {
            path: path.clone(),
            reason: reason.to_string(),
        };

        let value = plist::parse(contents).map_err(|source| ProjectError::Parse {
            path: path.join(PBXPROJ_FILE),
            source,
        })?;
        let Value::Dict(mut header) = value else {
            return Err(malformed("top level is not a dictionary"));
        };

        let objects = match header.remove("objects") {
            Some(Value::Dict(objects)) => objects,
            _ => return Err(malformed("missing objects table")),
        };
        let root_object = header
            .get("rootObject")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| malformed("missing rootObject"))?;
        if !objects.contains_key(&root_object) {
            return Err(malformed("rootObject does not name an object"));
        }

        Ok(Self {
            path,
            header,
            objects,
            root_object,
        })
    }

    /// Location of the `.xcodeproj` bundle
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pbxproj_path(&self) -> PathBuf {
        self.path.join(PBXPROJ_FILE)
    }

    /// Directory containing the bundle (`SOURCE_ROOT`)
    pub fn project_dir(&self) -> PathBuf {
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        match self.root_string("projectDirPath") {
            Some(extra) if !extra.is_empty() => normalize(&dir.join(extra)),
            _ => dir,
        }
    }

    /// Writes the document back to its original location
    pub fn save(&self) -> Result<(), ProjectError> {
        let target = self.pbxproj_path();
        fs::write(&target, self.to_pbxproj()).map_err(|source| ProjectError::Write {
            path: target.clone(),
            source,
        })?;
        debug!(path = %target.display(), "Saved Xcode project");
        Ok(())
    }

    pub(super) fn header(&self) -> &Dict {
        &self.header
    }

    pub fn objects(&self) -> &Dict {
        &self.objects
    }

    pub fn object(&self, id: &str) -> Option<&Dict> {
        self.objects.get(id).and_then(Value::as_dict)
    }

    fn object_mut(&mut self, id: &str) -> Option<&mut Dict> {
        self.objects.get_mut(id).and_then(Value::as_dict_mut)
    }

    pub fn isa(&self, id: &str) -> Option<&str> {
        self.string_attr(id, "isa")
    }

    pub fn string_attr(&self, id: &str, key: &str) -> Option<&str> {
        self.object(id)?.get(key).and_then(Value::as_str)
    }

    fn id_list(&self, id: &str, key: &str) -> Vec<String> {
        self.object(id)
            .and_then(|obj| obj.get(key))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn root_string(&self, key: &str) -> Option<&str> {
        self.string_attr(&self.root_object, key)
    }

    pub fn root_object_id(&self) -> &str {
        &self.root_object
    }

    pub fn main_group_id(&self) -> Option<String> {
        self.root_string("mainGroup").map(str::to_string)
    }

    /// Native targets in project order
    pub fn targets(&self) -> Vec<Target> {
        self.id_list(&self.root_object, "targets")
            .into_iter()
            .filter_map(|id| {
                let name = self.string_attr(&id, "name")?.to_string();
                let product_type = self.string_attr(&id, "productType").map(str::to_string);
                Some(Target {
                    id,
                    name,
                    product_type,
                })
            })
            .collect()
    }

    pub fn build_phases(&self, target_id: &str) -> Vec<String> {
        self.id_list(target_id, "buildPhases")
    }

    /// Phase name, falling back to the name Xcode shows for unnamed phases
    pub fn build_phase_name(&self, phase_id: &str) -> Option<String> {
        if let Some(name) = self.string_attr(phase_id, "name") {
            return Some(name.to_string());
        }
        default_phase_name(self.isa(phase_id)?).map(str::to_string)
    }

    /// The link ("Frameworks") phase of a target
    pub fn frameworks_phase(&self, target_id: &str) -> Option<String> {
        self.build_phases(target_id)
            .into_iter()
            .find(|id| self.isa(id) == Some("PBXFrameworksBuildPhase"))
    }

    pub fn phase_files(&self, phase_id: &str) -> Vec<String> {
        self.id_list(phase_id, "files")
    }

    pub fn build_file_reference(&self, build_file_id: &str) -> Option<String> {
        self.string_attr(build_file_id, "fileRef").map(str::to_string)
    }

    pub fn children(&self, group_id: &str) -> Vec<String> {
        self.id_list(group_id, "children")
    }

    /// The `name` of an item, or its `path` when unnamed
    pub fn display_name(&self, id: &str) -> Option<&str> {
        self.string_attr(id, "name")
            .or_else(|| self.string_attr(id, "path"))
    }

    /// Finds a group by title among the main group's children
    pub fn find_group(&self, title: &str) -> Option<String> {
        let main_group = self.main_group_id()?;
        self.children(&main_group).into_iter().find(|id| {
            matches!(self.isa(id), Some("PBXGroup") | Some("PBXVariantGroup"))
                && self.display_name(id) == Some(title)
        })
    }

    pub fn parent_of(&self, id: &str) -> Option<String> {
        self.objects.iter().find_map(|(candidate, value)| {
            let children = value.as_dict()?.get("children")?.as_array()?;
            children
                .iter()
                .any(|child| child.as_str() == Some(id))
                .then(|| candidate.clone())
        })
    }

    /// Resolves the filesystem location of a group or file reference
    pub fn real_path(&self, id: &str) -> Option<PathBuf> {
        let path = self.string_attr(id, "path");
        let source_tree = self.string_attr(id, "sourceTree").unwrap_or("<group>");

        let base = match source_tree {
            "<absolute>" => return path.map(|p| normalize(Path::new(p))),
            "SOURCE_ROOT" => self.project_dir(),
            "<group>" => match self.parent_of(id) {
                Some(parent) => self.real_path(&parent)?,
                None => self.project_dir(),
            },
            _ => return None,
        };

        Some(match path {
            Some(p) => normalize(&base.join(p)),
            None => base,
        })
    }

    pub fn shell_script(&self, phase_id: &str) -> Option<&str> {
        self.string_attr(phase_id, "shellScript")
    }

    /// Reads a shell script phase
    pub fn shell_script_phase(&self, phase_id: &str) -> Option<ShellScriptPhase> {
        if self.isa(phase_id) != Some("PBXShellScriptBuildPhase") {
            return None;
        }
        let strings = |key: &str| self.id_list(phase_id, key);
        Some(ShellScriptPhase {
            name: self.build_phase_name(phase_id).unwrap_or_default(),
            script: self.shell_script(phase_id).unwrap_or_default().to_string(),
            shell_path: self
                .string_attr(phase_id, "shellPath")
                .unwrap_or("/bin/sh")
                .to_string(),
            input_paths: strings("inputPaths"),
            output_paths: strings("outputPaths"),
            show_env_vars_in_log: self
                .string_attr(phase_id, "showEnvVarsInLog")
                .map(str::to_string),
        })
    }

    /// Returns a fresh object id
    pub fn generate_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().simple().to_string().to_uppercase()[..24].to_string();
            if !self.objects.contains_key(&id) {
                return id;
            }
        }
    }

    /// Removes a build file from a phase and deletes the build file object
    pub fn remove_build_file(&mut self, phase_id: &str, build_file_id: &str) -> bool {
        let removed = self
            .object_mut(phase_id)
            .and_then(|phase| phase.get_mut("files"))
            .and_then(Value::as_array_mut)
            .map(|files| {
                let before = files.len();
                files.retain(|file| file.as_str() != Some(build_file_id));
                before != files.len()
            })
            .unwrap_or(false);
        if removed {
            self.objects.remove(build_file_id);
        }
        removed
    }

    /// Removes build files from a target's link phase whose file name matches
    /// `pattern` and whose first capture is one of `libraries`. Returns the
    /// removed file names.
    pub fn remove_static_libraries(
        &mut self,
        target_id: &str,
        pattern: &Regex,
        libraries: &[String],
    ) -> Vec<String> {
        let Some(phase) = self.frameworks_phase(target_id) else {
            return Vec::new();
        };

        let doomed: Vec<(String, String)> = self
            .phase_files(&phase)
            .into_iter()
            .filter_map(|build_file| {
                let file_ref = self.build_file_reference(&build_file)?;
                let file_name = self
                    .string_attr(&file_ref, "path")
                    .or_else(|| self.string_attr(&file_ref, "name"))
                    .and_then(|p| Path::new(p).file_name())
                    .map(|name| name.to_string_lossy().to_string())?;
                let library = pattern.captures(&file_name)?.get(1)?.as_str().to_string();
                libraries
                    .contains(&library)
                    .then_some((build_file, file_name))
            })
            .collect();

        doomed
            .into_iter()
            .filter(|(build_file, _)| self.remove_build_file(&phase, build_file))
            .map(|(_, file_name)| file_name)
            .collect()
    }

    /// Creates a shell script phase and inserts it into a target's phases at `position`
    pub fn add_shell_script_phase(
        &mut self,
        target_id: &str,
        phase: &ShellScriptPhase,
        position: usize,
    ) -> Option<String> {
        self.object(target_id)?;
        let id = self.generate_id();

        let strings = |items: &[String]| {
            Value::Array(items.iter().map(|s| Value::from(s.as_str())).collect())
        };
        let mut object = Dict::new();
        object.insert("isa".into(), "PBXShellScriptBuildPhase".into());
        object.insert("buildActionMask".into(), "2147483647".into());
        object.insert("files".into(), Value::Array(Vec::new()));
        object.insert("inputPaths".into(), strings(&phase.input_paths));
        object.insert("name".into(), phase.name.as_str().into());
        object.insert("outputPaths".into(), strings(&phase.output_paths));
        object.insert("runOnlyForDeploymentPostprocessing".into(), "0".into());
        object.insert("shellPath".into(), phase.shell_path.as_str().into());
        object.insert("shellScript".into(), phase.script.as_str().into());
        if let Some(show) = &phase.show_env_vars_in_log {
            object.insert("showEnvVarsInLog".into(), show.as_str().into());
        }
        self.objects.insert(id.clone(), Value::Dict(object));

        let target = self.object_mut(target_id)?;
        let phases = target
            .entry("buildPhases".to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Some(list) = phases.as_array_mut() {
            let position = position.min(list.len());
            list.insert(position, Value::from(id.as_str()));
        }
        Some(id)
    }

    /// Overwrites the name and script body of an existing shell script phase
    pub fn update_shell_script_phase(&mut self, phase_id: &str, name: &str, script: &str) -> bool {
        match self.object_mut(phase_id) {
            Some(phase) => {
                phase.insert("name".into(), name.into());
                phase.insert("shellScript".into(), script.into());
                true
            }
            None => false,
        }
    }

    /// Removes a group, everything beneath it, and every object that only
    /// existed to reference those items (sub-project references, proxies,
    /// build files, target dependencies).
    pub fn remove_group(&mut self, group_id: &str) -> usize {
        if !self.objects.contains_key(group_id) {
            return 0;
        }

        let mut doomed: HashSet<String> = HashSet::new();
        let mut pending = vec![group_id.to_string()];
        while let Some(id) = pending.pop() {
            if doomed.insert(id.clone()) {
                pending.extend(self.children(&id));
            }
        }

        // Sub-project entries pull in their Products groups.
        loop {
            let before = doomed.len();

            for entry in self.project_references() {
                if doomed.contains(&entry.project_ref) {
                    if let Some(product_group) = entry.product_group {
                        let mut pending = vec![product_group];
                        while let Some(id) = pending.pop() {
                            if doomed.insert(id.clone()) {
                                pending.extend(self.children(&id));
                            }
                        }
                    }
                }
            }

            let dependents: Vec<String> = self
                .objects
                .iter()
                .filter(|(id, _)| !doomed.contains(id.as_str()))
                .filter_map(|(id, value)| {
                    let obj = value.as_dict()?;
                    let pointer = match obj.get("isa").and_then(Value::as_str)? {
                        "PBXBuildFile" => "fileRef",
                        "PBXContainerItemProxy" => "containerPortal",
                        "PBXReferenceProxy" => "remoteRef",
                        "PBXTargetDependency" => "targetProxy",
                        _ => return None,
                    };
                    let target = obj.get(pointer).and_then(Value::as_str)?;
                    doomed.contains(target).then(|| id.clone())
                })
                .collect();
            doomed.extend(dependents);

            if doomed.len() == before {
                break;
            }
        }

        for id in &doomed {
            self.objects.remove(id);
        }
        self.scrub_references(&doomed);

        debug!(group = group_id, removed = doomed.len(), "Removed group");
        doomed.len()
    }

    fn project_references(&self) -> Vec<ProjectReference> {
        self.object(&self.root_object)
            .and_then(|root| root.get("projectReferences"))
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(Value::as_dict)
                    .filter_map(|entry| {
                        Some(ProjectReference {
                            project_ref: entry.get("ProjectRef")?.as_str()?.to_string(),
                            product_group: entry
                                .get("ProductGroup")
                                .and_then(Value::as_str)
                                .map(str::to_string),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Drops ids in `removed` from every array in the object table
    fn scrub_references(&mut self, removed: &HashSet<String>) {
        for value in self.objects.values_mut() {
            let Some(obj) = value.as_dict_mut() else {
                continue;
            };
            for field in obj.values_mut() {
                if let Some(items) = field.as_array_mut() {
                    items.retain(|item| !item.as_str().is_some_and(|s| removed.contains(s)));
                }
            }
            if let Some(references) = obj
                .get_mut("projectReferences")
                .and_then(Value::as_array_mut)
            {
                references.retain(|entry| {
                    !entry
                        .as_dict()
                        .and_then(|d| d.get("ProjectRef"))
                        .and_then(Value::as_str)
                        .is_some_and(|s| removed.contains(s))
                });
            }
            if obj
                .get("projectReferences")
                .and_then(Value::as_array)
                .is_some_and(|refs| refs.is_empty())
            {
                obj.remove("projectReferences");
            }
        }
    }

    /// Comment text Xcode prints next to each object id
    pub(super) fn annotations(&self) -> HashMap<String, String> {
        let mut phase_of = HashMap::new();
        let mut owner_of = HashMap::new();
        for (id, value) in &self.objects {
            let Some(obj) = value.as_dict() else {
                continue;
            };
            if let Some(files) = obj.get("files").and_then(Value::as_array) {
                if let Some(name) = self.build_phase_name(id) {
                    for file in files.iter().filter_map(Value::as_str) {
                        phase_of.insert(file.to_string(), name.clone());
                    }
                }
            }
            if let Some(list) = obj.get("buildConfigurationList").and_then(Value::as_str) {
                owner_of.insert(list.to_string(), id.clone());
            }
        }

        let mut notes = HashMap::new();
        for (id, value) in &self.objects {
            let Some(isa) = value
                .as_dict()
                .and_then(|obj| obj.get("isa"))
                .and_then(Value::as_str)
            else {
                continue;
            };
            let note = match isa {
                "PBXProject" => Some("Project object".to_string()),
                "PBXContainerItemProxy" | "PBXTargetDependency" => Some(isa.to_string()),
                "PBXBuildFile" => self
                    .build_file_reference(id)
                    .and_then(|file| self.display_name(&file).map(str::to_string))
                    .map(|file| match phase_of.get(id) {
                        Some(phase) => format!("{} in {}", file, phase),
                        None => file,
                    }),
                "XCConfigurationList" => owner_of.get(id).map(|owner| {
                    let owner_isa = self.isa(owner).unwrap_or_default();
                    let owner_name = if owner_isa == "PBXProject" {
                        self.bundle_name()
                    } else {
                        self.display_name(owner).unwrap_or_default().to_string()
                    };
                    format!(
                        "Build configuration list for {} \"{}\"",
                        owner_isa, owner_name
                    )
                }),
                _ if isa.ends_with("BuildPhase") => self.build_phase_name(id),
                _ => self.display_name(id).map(str::to_string),
            };
            if let Some(note) = note {
                notes.insert(id.clone(), note);
            }
        }
        notes
    }

    fn bundle_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

struct ProjectReference {
    project_ref: String,
    product_group: Option<String>,
}

fn default_phase_name(isa: &str) -> Option<&'static str> {
    match isa {
        "PBXFrameworksBuildPhase" => Some("Frameworks"),
        "PBXSourcesBuildPhase" => Some("Sources"),
        "PBXResourcesBuildPhase" => Some("Resources"),
        "PBXHeadersBuildPhase" => Some("Headers"),
        "PBXCopyFilesBuildPhase" => Some("CopyFiles"),
        "PBXShellScriptBuildPhase" => Some("ShellScript"),
        _ => None,
    }
}

/// Lexically resolves `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xcode::fixtures;

    fn sample() -> XcodeProject {
        XcodeProject::from_pbxproj("/repo/ios/SampleApp.xcodeproj", fixtures::SAMPLE_APP).unwrap()
    }

    #[test]
    fn test_targets_in_project_order() {
        let names: Vec<String> = sample().targets().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["SampleApp", "SampleAppTests", "SampleApp-tvOS"]);
    }

    #[test]
    fn test_target_product_types() {
        let targets = sample().targets();
        assert!(targets[0].is_application());
        assert!(targets[1].is_unit_test());
        assert!(targets[2].is_application());
    }

    #[test]
    fn test_find_group() {
        let project = sample();
        let libraries = project.find_group("Libraries").unwrap();
        assert_eq!(project.children(&libraries).len(), 4);
        assert!(project.find_group("Frameworks").is_none());
    }

    #[test]
    fn test_real_path_resolves_group_hierarchy() {
        let project = sample();
        let libraries = project.find_group("Libraries").unwrap();
        let react = project
            .children(&libraries)
            .into_iter()
            .find(|id| project.display_name(id) == Some("React.xcodeproj"))
            .unwrap();
        assert_eq!(
            project.real_path(&react).unwrap(),
            PathBuf::from("/repo/node_modules/react-native/React/React.xcodeproj")
        );
    }

    #[test]
    fn test_frameworks_phase_names() {
        let project = sample();
        let app = &project.targets()[0];
        let phase = project.frameworks_phase(&app.id).unwrap();
        assert_eq!(project.build_phase_name(&phase).as_deref(), Some("Frameworks"));
        assert_eq!(project.phase_files(&phase).len(), 3);
    }

    #[test]
    fn test_remove_build_file() {
        let mut project = sample();
        let app = project.targets()[0].clone();
        let phase = project.frameworks_phase(&app.id).unwrap();
        let file = project.phase_files(&phase)[0].clone();

        assert!(project.remove_build_file(&phase, &file));
        assert!(!project.objects().contains_key(&file));
        assert_eq!(project.phase_files(&phase).len(), 2);
        assert!(!project.remove_build_file(&phase, &file));
    }

    #[test]
    fn test_remove_group_sweeps_dependents() {
        let mut project = sample();
        let libraries = project.find_group("Libraries").unwrap();
        let removed = project.remove_group(&libraries);

        assert!(removed > 4);
        assert!(project.find_group("Libraries").is_none());
        let main_group = project.main_group_id().unwrap();
        assert!(!project.children(&main_group).contains(&libraries));
        let root_id = project.root_object_id().to_string();
        for obj in project.objects().values().filter_map(Value::as_dict) {
            match obj.get("isa").and_then(Value::as_str) {
                Some("PBXReferenceProxy") => panic!("reference proxy survived"),
                Some("PBXContainerItemProxy") => assert_eq!(
                    obj.get("containerPortal").and_then(Value::as_str),
                    Some(root_id.as_str())
                ),
                _ => {}
            }
        }
        // The test target still depends on the app through the project itself.
        assert!(project.object("00E356F51AD99517003FC87E").is_some());
        let root = project.object(project.root_object_id()).unwrap();
        assert!(root.get("projectReferences").is_none());
    }

    #[test]
    fn test_remove_static_libraries() {
        let mut project = sample();
        let app = project.targets()[0].clone();
        let pattern = Regex::new(r"^lib(.+)\.a$").unwrap();
        let libraries = vec!["MyCustomDep".to_string(), "RCTText".to_string()];

        let removed = project.remove_static_libraries(&app.id, &pattern, &libraries);
        assert_eq!(removed, vec!["libMyCustomDep.a"]);

        let phase = project.frameworks_phase(&app.id).unwrap();
        let remaining: Vec<String> = project
            .phase_files(&phase)
            .iter()
            .filter_map(|f| project.build_file_reference(f))
            .filter_map(|r| project.display_name(&r).map(str::to_string))
            .collect();
        assert_eq!(remaining, vec!["libReact.a", "libRCTImage.a"]);
        assert!(!project.objects().contains_key("11AA00000000000000000001"));
    }

    #[test]
    fn test_add_shell_script_phase_first() {
        let mut project = sample();
        let app = project.targets()[0].clone();
        let phase = ShellScriptPhase::new("Start Packager", "echo hi");

        let id = project.add_shell_script_phase(&app.id, &phase, 0).unwrap();
        assert_eq!(project.build_phases(&app.id)[0], id);
        assert_eq!(project.shell_script_phase(&id).unwrap(), phase);
    }

    #[test]
    fn test_generate_id_shape() {
        let id = sample().generate_id();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_malformed_project() {
        let err = XcodeProject::from_pbxproj("/x.xcodeproj", "{ objects = {}; }").unwrap_err();
        assert!(matches!(err, ProjectError::Malformed { .. }));

        let err = XcodeProject::from_pbxproj("/x.xcodeproj", "{ objects = ").unwrap_err();
        assert!(matches!(err, ProjectError::Parse { .. }));
    }

    #[test]
    fn test_open_missing_bundle() {
        let err = XcodeProject::open("/nonexistent/App.xcodeproj").unwrap_err();
        assert!(matches!(err, ProjectError::NotFound(_)));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/repo/ios/../node_modules/./x")),
            PathBuf::from("/repo/node_modules/x")
        );
        assert_eq!(normalize(Path::new("../a/../b")), PathBuf::from("../b"));
    }
}
