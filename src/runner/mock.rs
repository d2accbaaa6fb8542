use super::{temp_log, CommandOutput, CommandRunner, CommandSpec};
use crate::error::{Error, ExecutionError, Result};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

/// Records commands instead of running them
///
/// Every program is found on `PATH` under `/usr/local/bin` unless marked
/// missing, and every command succeeds with empty output unless a scripted
/// response matches it. Responses match on the command line prefix, first
/// registered wins.
pub struct MockRunner {
    calls: Mutex<Vec<CommandSpec>>,
    responses: Mutex<Vec<(String, CommandOutput)>>,
    missing: HashSet<String>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(Vec::new()),
            missing: HashSet::new(),
        }
    }

    /// Treats `program` as not installed
    pub fn with_missing(mut self, program: impl Into<String>) -> Self {
        self.missing.insert(program.into());
        self
    }

    /// Scripts the result of every command starting with `prefix`
    pub fn respond(&self, prefix: impl Into<String>, output: CommandOutput) {
        self.responses.lock().unwrap().push((prefix.into(), output));
    }

    /// Makes commands starting with `prefix` exit with `code`
    pub fn fail(&self, prefix: impl Into<String>, code: i32) {
        self.respond(prefix, CommandOutput::failed(code));
    }

    /// Command lines in invocation order
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded command lines for one program
    pub fn calls_to(&self, program: &str) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|spec| spec.program == program)
            .map(ToString::to_string)
            .collect()
    }

    fn record(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        if self.missing.contains(&spec.program) {
            return Err(Error::CommandNotFound(spec.program.clone()));
        }

        let line = spec.to_string();
        let output = self
            .responses
            .lock()
            .unwrap()
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::ok(""));
        Ok(output)
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner for MockRunner {
    fn which(&self, program: &str) -> Option<PathBuf> {
        if self.missing.contains(program) {
            None
        } else {
            Some(PathBuf::from("/usr/local/bin").join(program))
        }
    }

    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.record(spec)
    }

    fn run(&self, spec: &CommandSpec) -> Result<()> {
        let output = self.record(spec)?;
        if output.success() {
            return Ok(());
        }
        let log = spec
            .log
            .clone()
            .unwrap_or_else(|| temp_log(&spec.program));
        Err(ExecutionError::with_code(spec.to_string(), output.status, log).into())
    }
}

impl std::fmt::Debug for MockRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRunner")
            .field("calls", &self.calls.lock().unwrap().len())
            .field("missing", &self.missing)
            .finish()
    }
}
