//! Subcommand handlers. Each returns the process exit code.

use super::commands::ConvertArgs;
use crate::config::ConverterConfig;
use crate::converter::{ConvertOutcome, Converter};
use crate::runner::SystemRunner;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Repository root: `-C <dir>` or the current directory, made absolute
pub fn resolve_root(directory: Option<&Path>) -> std::io::Result<PathBuf> {
    let cwd = env::current_dir()?;
    Ok(match directory {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => cwd.join(dir),
        None => cwd,
    })
}

fn converter(
    directory: Option<&Path>,
    config: ConverterConfig,
    quiet: bool,
) -> Option<Converter<SystemRunner>> {
    match resolve_root(directory) {
        Ok(root) => {
            debug!(root = %root.display(), "Repository root");
            Some(Converter::new(config, SystemRunner::new(quiet), root))
        }
        Err(e) => {
            error!("Cannot determine the working directory: {}", e);
            None
        }
    }
}

pub fn handle_convert(args: &ConvertArgs, directory: Option<&Path>, quiet: bool) -> i32 {
    let config = ConverterConfig::default().with_repo_update(args.repo_update());
    debug!("{}", config);

    let Some(converter) = converter(directory, config, quiet) else {
        return 1;
    };

    match converter.convert() {
        Ok(ConvertOutcome::NothingToDo) => 0,
        Ok(ConvertOutcome::Converted {
            dependencies,
            resumed,
        }) => {
            debug!(?dependencies, resumed, "Converted");
            0
        }
        Err(e) => {
            error!("Conversion failed: {}", e);
            1
        }
    }
}

pub fn handle_update(directory: Option<&Path>, quiet: bool) -> i32 {
    let Some(converter) = converter(directory, ConverterConfig::default(), quiet) else {
        return 1;
    };

    match converter.update() {
        Ok(outcome) => {
            debug!(?outcome, "Update finished");
            0
        }
        Err(e) => {
            error!("Update failed: {}", e);
            1
        }
    }
}
