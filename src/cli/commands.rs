use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Converts a React Native iOS app from the Libraries group to CocoaPods
#[derive(Parser, Debug)]
#[command(
    name = "react-pod",
    about = "Converts a React Native iOS app from the Libraries group to CocoaPods",
    version,
    author,
    long_about = "react-pod replaces the static-library sub-projects in the Libraries group \
                  of a React Native app's Xcode project with a generated Podfile, relinks \
                  native dependencies through react-native link and runs pod install."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug output")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(
        short = 'C',
        long,
        global = true,
        value_name = "DIR",
        help = "Repository root containing package.json (defaults to current directory)"
    )]
    pub directory: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Convert the app to use a Podfile",
        long_about = "Unlinks the dependencies in the Libraries group, removes the group and \
                      its static libraries, adds a Start Packager build phase, generates \
                      ios/Podfile, relinks the dependencies and runs pod install.\n\n\
                      Examples:\n  \
                      react-pod convert\n  \
                      react-pod convert --no-repo-update\n  \
                      react-pod -C /path/to/app convert"
    )]
    Convert(ConvertArgs),

    #[command(
        about = "Update the packager build phase of a converted app",
        long_about = "Copies the packager script from node_modules/react-native into the app \
                      target's Start Packager build phase when it has changed.\n\n\
                      Examples:\n  \
                      react-pod update"
    )]
    Update,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConvertArgs {
    #[arg(
        long,
        conflicts_with = "no_repo_update",
        help = "Run pod install with --repo-update (default unless REACT_POD_REPO_UPDATE is false)"
    )]
    pub repo_update: bool,

    #[arg(long, help = "Run pod install without --repo-update")]
    pub no_repo_update: bool,
}

impl ConvertArgs {
    /// The explicit choice, `None` when neither flag is given
    pub fn repo_update(&self) -> Option<bool> {
        match (self.repo_update, self.no_repo_update) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
