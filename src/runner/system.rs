use super::{temp_log, CommandOutput, CommandRunner, CommandSpec};
use crate::error::{Error, ExecutionError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::debug;

/// Spawns real processes
#[derive(Debug, Clone)]
pub struct SystemRunner {
    show_progress: bool,
}

impl SystemRunner {
    /// Spinners are shown only when stderr is a terminal and `quiet` is off
    pub fn new(quiet: bool) -> Self {
        Self {
            show_progress: !quiet && atty::is(atty::Stream::Stderr),
        }
    }

    fn command(spec: &CommandSpec) -> Command {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args);
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }
        command
    }

    fn spinner(&self, spec: &CommandSpec) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let style = ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .ok()?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"]);
        let pb = ProgressBar::new_spinner();
        pb.set_style(style);
        pb.set_message(spec.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(false)
    }
}

fn spawn_error(program: &str, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::CommandNotFound(program.to_string())
    } else {
        Error::Io(err)
    }
}

impl CommandRunner for SystemRunner {
    fn which(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }

    fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(command = %spec, "Capturing command output");
        let output = Self::command(spec)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| spawn_error(&spec.program, e))?;

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    fn run(&self, spec: &CommandSpec) -> Result<()> {
        let log = spec
            .log
            .clone()
            .unwrap_or_else(|| temp_log(&spec.program));
        debug!(command = %spec, log = %log.display(), "Running command");

        let stdout = File::create(&log)?;
        let stderr = stdout.try_clone()?;

        let pb = self.spinner(spec);
        let status = Self::command(spec)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .status();
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        let status = status.map_err(|e| spawn_error(&spec.program, e))?;
        if !status.success() {
            return Err(ExecutionError::new(spec.to_string(), status, log).into());
        }
        Ok(())
    }
}
