//! External command execution
//!
//! Every external tool (`yarn`, `react-native`, `pod`, `git`, `open`, `uname`)
//! is invoked through [`CommandRunner`]. [`SystemRunner`] spawns real
//! processes; [`MockRunner`] records invocations and returns scripted results.

mod mock;
mod system;

pub use mock::MockRunner;
pub use system::SystemRunner;

use crate::error::Result;
use std::fmt;
use std::path::{Path, PathBuf};

/// A command line to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub log: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            log: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// File receiving combined stdout and stderr when run through [`CommandRunner::run`]
    pub fn log(mut self, path: impl AsRef<Path>) -> Self {
        self.log = Some(path.as_ref().to_path_buf());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Collected result of a captured command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when killed by a signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32) -> Self {
        Self {
            status: Some(code),
            ..Default::default()
        }
    }
}

pub trait CommandRunner {
    /// Resolves a program on `PATH`
    fn which(&self, program: &str) -> Option<PathBuf>;

    /// Runs a command and collects its output. A non-zero exit is not an error.
    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Runs a command with output sent to its log file. A non-zero exit is an
    /// [`crate::error::ExecutionError`].
    fn run(&self, spec: &CommandSpec) -> Result<()>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn which(&self, program: &str) -> Option<PathBuf> {
        (**self).which(program)
    }

    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        (**self).capture(spec)
    }

    fn run(&self, spec: &CommandSpec) -> Result<()> {
        (**self).run(spec)
    }
}

/// Log file location for a command, under the system temp directory
pub fn temp_log(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}.log", name))
}
