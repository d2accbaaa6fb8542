//! End-to-end conversion and update runs against a copy of the SampleApp fixture
//!
//! External commands go through `MockRunner`; the project files are real.

use react_pod::converter::{RunRecord, RunState};
use react_pod::{
    ConversionError, ConvertOutcome, Converter, ConverterConfig, Error, MockRunner, UpdateOutcome,
    XcodeProject,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    _temp: TempDir,
    root: PathBuf,
    pods_repo: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let root = temp.path().join("SampleApp");
        copy_dir(
            &Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/SampleApp"),
            &root,
        );
        let pods_repo = temp.path().join("cocoapods-master");
        fs::create_dir_all(&pods_repo).unwrap();
        Self {
            _temp: temp,
            root,
            pods_repo,
        }
    }

    fn config(&self) -> ConverterConfig {
        let mut config = ConverterConfig::default();
        config.require_macos = false;
        config.repo_update = false;
        config.cocoapods_repo_dir = Some(self.pods_repo.clone());
        config
    }

    fn converter<'r>(&self, runner: &'r MockRunner) -> Converter<&'r MockRunner> {
        Converter::new(self.config(), runner, &self.root)
    }

    fn pbxproj(&self) -> String {
        fs::read_to_string(self.root.join("ios/SampleApp.xcodeproj/project.pbxproj")).unwrap()
    }

    fn podfile(&self) -> PathBuf {
        self.root.join("ios/Podfile")
    }

    fn state_file(&self) -> PathBuf {
        self.root.join("ios/.react-pod-state.json")
    }
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_dir(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}

const PREFLIGHT_CALLS: &[&str] = &[
    "git rev-parse --git-dir",
    "git diff-index --quiet HEAD --",
    "yarn check --integrity",
    "yarn check --verify-tree",
    "uname -msr",
    "yarn --version",
    "react-native --version",
    "pod --version",
];

#[test]
fn test_convert_runs_steps_in_order() {
    let fixture = Fixture::new();
    let runner = MockRunner::new();

    let outcome = fixture.converter(&runner).convert().unwrap();
    assert_eq!(
        outcome,
        ConvertOutcome::Converted {
            dependencies: vec!["MyCustomDep".to_string()],
            resumed: false
        }
    );

    let mut expected: Vec<&str> = PREFLIGHT_CALLS.to_vec();
    expected.extend([
        "react-native unlink MyCustomDep",
        "react-native link MyCustomDep",
        "pod install",
        "open ios/SampleApp.xcworkspace",
    ]);
    assert_eq!(runner.calls(), expected);

    let install = runner
        .specs()
        .into_iter()
        .find(|spec| spec.program == "pod")
        .unwrap();
    assert_eq!(install.cwd, Some(fixture.root.join("ios")));
    assert!(!fixture.state_file().exists());
}

#[test]
fn test_convert_rewrites_project() {
    let fixture = Fixture::new();
    let runner = MockRunner::new();
    fixture.converter(&runner).convert().unwrap();

    let pbxproj = fixture.pbxproj();
    assert!(!pbxproj.contains("MyCustomDep.xcodeproj"));
    assert!(!pbxproj.contains("libMyCustomDep.a"));
    assert!(pbxproj.contains("/* Start Packager */"));
    assert!(pbxproj.contains("../node_modules/react-native/scripts/.packager.env"));

    let project = XcodeProject::open(fixture.root.join("ios/SampleApp.xcodeproj")).unwrap();
    assert!(project.find_group("Libraries").is_none());

    let app = project
        .targets()
        .into_iter()
        .find(|t| t.name == "SampleApp")
        .unwrap();
    let first_phase = project.build_phases(&app.id)[0].clone();
    assert_eq!(
        project.build_phase_name(&first_phase).as_deref(),
        Some("Start Packager")
    );
}

#[test]
fn test_convert_generates_podfile() {
    let fixture = Fixture::new();
    let runner = MockRunner::new();
    fixture.converter(&runner).convert().unwrap();

    let podfile = fs::read_to_string(fixture.podfile()).unwrap();
    assert!(podfile.contains("target 'SampleApp' do"));
    assert!(podfile.contains("  # - MyCustomDep"));
    assert!(podfile.contains("target 'SampleAppTests' do"));
    assert!(podfile.contains("pod 'React', path: '../node_modules/react-native'"));
}

#[test]
fn test_second_convert_is_refused_without_commands() {
    let fixture = Fixture::new();
    fixture.converter(&MockRunner::new()).convert().unwrap();
    let before = fixture.pbxproj();

    let runner = MockRunner::new();
    let err = fixture.converter(&runner).convert().unwrap_err();

    assert!(matches!(
        err,
        Error::Conversion(ConversionError::AlreadyConverted(_))
    ));
    assert!(runner.calls().is_empty());
    assert_eq!(fixture.pbxproj(), before);
}

#[test]
fn test_project_without_libraries_group_is_left_alone() {
    let fixture = Fixture::new();
    fixture.converter(&MockRunner::new()).convert().unwrap();
    fs::remove_file(fixture.podfile()).unwrap();
    let before = fixture.pbxproj();

    let runner = MockRunner::new();
    let outcome = fixture.converter(&runner).convert().unwrap();

    assert_eq!(outcome, ConvertOutcome::NothingToDo);
    assert!(!fixture.podfile().exists());
    assert_eq!(fixture.pbxproj(), before);
    assert!(runner.calls_to("react-native").iter().all(|c| c == "react-native --version"));
    assert!(runner.calls_to("pod").iter().all(|c| c == "pod --version"));
}

#[test]
fn test_missing_manifest() {
    let fixture = Fixture::new();
    fs::remove_file(fixture.root.join("package.json")).unwrap();

    let err = fixture.converter(&MockRunner::new()).convert().unwrap_err();
    assert!(matches!(
        err,
        Error::Conversion(ConversionError::ManifestNotFound(_))
    ));
}

#[test]
fn test_malformed_manifest() {
    let fixture = Fixture::new();
    fs::write(fixture.root.join("package.json"), "{ \"name\": ").unwrap();

    let err = fixture.converter(&MockRunner::new()).convert().unwrap_err();
    assert!(matches!(
        err,
        Error::Conversion(ConversionError::ManifestParse(_))
    ));
}

#[test]
fn test_dirty_working_tree() {
    let fixture = Fixture::new();
    let runner = MockRunner::new();
    runner.fail("git diff-index", 1);

    let err = fixture.converter(&runner).convert().unwrap_err();
    assert!(matches!(
        err,
        Error::Conversion(ConversionError::UncommittedChanges)
    ));
    assert!(runner.calls_to("react-native").is_empty());
}

#[test]
fn test_missing_command() {
    let fixture = Fixture::new();
    let runner = MockRunner::new().with_missing("react-native");

    let err = fixture.converter(&runner).convert().unwrap_err();
    assert!(matches!(err, Error::CommandNotFound(ref p) if p == "react-native"));
    assert!(runner.calls().is_empty());
}

#[test]
fn test_failed_link_resumes_on_next_run() {
    let fixture = Fixture::new();
    let runner = MockRunner::new();
    runner.fail("react-native link", 1);

    let err = fixture.converter(&runner).convert().unwrap_err();
    match err {
        Error::Execution(e) => {
            assert_eq!(e.command, "react-native link MyCustomDep");
            assert!(e.log.ends_with("react-native-link-MyCustomDep.log"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let record = RunRecord::load(&fixture.state_file()).unwrap().unwrap();
    assert_eq!(record.state, RunState::ConfigWritten);
    assert!(fixture.podfile().exists());

    let runner = MockRunner::new();
    let outcome = fixture.converter(&runner).convert().unwrap();

    assert_eq!(
        outcome,
        ConvertOutcome::Converted {
            dependencies: vec!["MyCustomDep".to_string()],
            resumed: true
        }
    );
    assert!(runner.calls_to("git").is_empty());
    assert_eq!(
        runner.calls_to("react-native"),
        vec!["react-native --version", "react-native link MyCustomDep"]
    );
    assert_eq!(runner.calls_to("pod"), vec!["pod --version", "pod install"]);
    assert!(!fixture.state_file().exists());
}

#[test]
fn test_resume_from_group_removed() {
    let fixture = Fixture::new();
    let mut record = RunRecord::new("SampleApp", vec!["MyCustomDep".to_string()], vec![]);
    record
        .advance(RunState::GroupRemoved, &fixture.state_file())
        .unwrap();
    let before = fixture.pbxproj();

    let runner = MockRunner::new();
    fixture.converter(&runner).convert().unwrap();

    assert_eq!(fixture.pbxproj(), before);
    assert!(fixture.podfile().exists());
    assert_eq!(
        runner.calls_to("react-native"),
        vec!["react-native --version", "react-native link MyCustomDep"]
    );
}

#[test]
fn test_update_requires_conversion() {
    let fixture = Fixture::new();

    let err = fixture.converter(&MockRunner::new()).update().unwrap_err();
    match err {
        Error::Conversion(ConversionError::ConversionRequired(message)) => {
            assert!(message.starts_with("Libraries group present in"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_update_without_podfile() {
    let fixture = Fixture::new();
    fixture.converter(&MockRunner::new()).convert().unwrap();
    fs::remove_file(fixture.podfile()).unwrap();

    let err = fixture.converter(&MockRunner::new()).update().unwrap_err();
    assert!(err.to_string().contains("ios/Podfile not found"));
}

#[test]
fn test_update_up_to_date_leaves_project_alone() {
    let fixture = Fixture::new();
    fixture.converter(&MockRunner::new()).convert().unwrap();
    let before = fixture.pbxproj();

    let outcome = fixture.converter(&MockRunner::new()).update().unwrap();

    assert_eq!(outcome, UpdateOutcome::UpToDate);
    assert_eq!(fixture.pbxproj(), before);
}

#[test]
fn test_update_copies_changed_script() {
    let fixture = Fixture::new();
    fixture.converter(&MockRunner::new()).convert().unwrap();

    let react = fixture
        .root
        .join("node_modules/react-native/React/React.xcodeproj/project.pbxproj");
    let contents = fs::read_to_string(&react).unwrap();
    fs::write(
        &react,
        contents.replace("launchPackager.command", "launchPackager2.command"),
    )
    .unwrap();

    let outcome = fixture.converter(&MockRunner::new()).update().unwrap();

    assert_eq!(outcome, UpdateOutcome::Updated);
    assert!(fixture
        .pbxproj()
        .contains("../node_modules/react-native/scripts/launchPackager2.command"));

    let again = fixture.converter(&MockRunner::new()).update().unwrap();
    assert_eq!(again, UpdateOutcome::UpToDate);
}

fn packager_phase_count(fixture: &Fixture) -> usize {
    let project = XcodeProject::open(fixture.root.join("ios/SampleApp.xcodeproj")).unwrap();
    let app = project
        .targets()
        .into_iter()
        .find(|t| t.name == "SampleApp")
        .unwrap();
    project
        .build_phases(&app.id)
        .iter()
        .filter(|id| project.build_phase_name(id).as_deref() == Some("Start Packager"))
        .count()
}

#[test]
fn test_replay_after_saved_project_keeps_one_packager_phase() {
    let fixture = Fixture::new();
    let runner = MockRunner::new();
    runner.fail("react-native link", 1);
    fixture.converter(&runner).convert().unwrap_err();
    assert_eq!(packager_phase_count(&fixture), 1);

    // The project was saved but the record never advanced past unlink
    let mut record = RunRecord::load(&fixture.state_file()).unwrap().unwrap();
    record.state = RunState::Unlinked;
    record.save(&fixture.state_file()).unwrap();

    let runner = MockRunner::new();
    let outcome = fixture.converter(&runner).convert().unwrap();

    assert!(matches!(outcome, ConvertOutcome::Converted { resumed: true, .. }));
    assert_eq!(packager_phase_count(&fixture), 1);
    assert!(runner.calls_to("react-native").iter().all(|c| !c.contains("unlink")));
}

#[test]
fn test_resume_refuses_record_for_another_app() {
    let fixture = Fixture::new();
    let mut record = RunRecord::new("OtherApp", vec!["MyCustomDep".to_string()], vec![]);
    record
        .advance(RunState::GroupRemoved, &fixture.state_file())
        .unwrap();
    let before = fixture.pbxproj();

    let runner = MockRunner::new();
    let err = fixture.converter(&runner).convert().unwrap_err();

    match err {
        Error::Conversion(ConversionError::RunState { path, message }) => {
            assert_eq!(path, fixture.state_file());
            assert!(message.contains("OtherApp"));
            assert!(message.contains("SampleApp"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(runner.calls_to("react-native").iter().all(|c| c == "react-native --version"));
    assert!(!fixture.podfile().exists());
    assert_eq!(fixture.pbxproj(), before);
    assert!(fixture.state_file().exists());
}

#[test]
fn test_update_without_packager_phase() {
    let fixture = Fixture::new();
    fixture.converter(&MockRunner::new()).convert().unwrap();

    let path = fixture.root.join("ios/SampleApp.xcodeproj/project.pbxproj");
    fs::write(&path, fixture.pbxproj().replace("Start Packager", "Launch Metro")).unwrap();
    let before = fixture.pbxproj();

    let outcome = fixture.converter(&MockRunner::new()).update().unwrap();

    assert_eq!(outcome, UpdateOutcome::PhaseMissing);
    assert_eq!(fixture.pbxproj(), before);
}
