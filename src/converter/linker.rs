//! `react-native link` / `react-native unlink` driver

use crate::error::Result;
use crate::runner::{temp_log, CommandRunner, CommandSpec};
use std::fmt;
use std::path::Path;
use tracing::info;

const REACT_NATIVE: &str = "react-native";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkAction {
    Unlink,
    Link,
}

impl LinkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkAction::Unlink => "unlink",
            LinkAction::Link => "link",
        }
    }
}

impl fmt::Display for LinkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command for one dependency, logging to `$TMPDIR/react-native-<action>-<dep>.log`
pub fn command(action: LinkAction, dependency: &str, root: &Path) -> CommandSpec {
    CommandSpec::new(REACT_NATIVE)
        .args([action.as_str(), dependency])
        .current_dir(root)
        .log(temp_log(&format!("{}-{}-{}", REACT_NATIVE, action, dependency)))
}

/// Runs `action` for each dependency in order, stopping at the first failure
pub fn run_all<R: CommandRunner>(
    runner: &R,
    action: LinkAction,
    dependencies: &[String],
    root: &Path,
) -> Result<()> {
    if dependencies.is_empty() {
        return Ok(());
    }
    match action {
        LinkAction::Unlink => info!("Unlinking dependencies"),
        LinkAction::Link => info!("Linking dependencies"),
    }
    for dependency in dependencies {
        info!(" {} {}", action, dependency);
        runner.run(&command(action, dependency, root))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::runner::MockRunner;

    #[test]
    fn test_command_shape() {
        let spec = command(LinkAction::Unlink, "MyCustomDep", Path::new("/repo"));
        assert_eq!(spec.to_string(), "react-native unlink MyCustomDep");
        assert_eq!(spec.cwd.as_deref(), Some(Path::new("/repo")));
        assert!(spec
            .log
            .unwrap()
            .ends_with("react-native-unlink-MyCustomDep.log"));
    }

    #[test]
    fn test_run_all_in_order() {
        let runner = MockRunner::new();
        let deps = vec!["a".to_string(), "b".to_string()];
        run_all(&runner, LinkAction::Link, &deps, Path::new("/repo")).unwrap();
        assert_eq!(
            runner.calls(),
            vec!["react-native link a", "react-native link b"]
        );
    }

    #[test]
    fn test_failure_stops_the_run() {
        let runner = MockRunner::new();
        runner.fail("react-native unlink a", 1);
        let deps = vec!["a".to_string(), "b".to_string()];

        let err = run_all(&runner, LinkAction::Unlink, &deps, Path::new("/repo")).unwrap_err();
        match err {
            Error::Execution(e) => {
                assert_eq!(e.command, "react-native unlink a");
                assert!(e.log.ends_with("react-native-unlink-a.log"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(runner.calls().len(), 1);
    }
}
