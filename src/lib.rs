//! react-pod - moves a React Native iOS app from the Libraries group to CocoaPods
//!
//! Older React Native apps link React and every native dependency as static
//! libraries built by sub-projects in the `Libraries` group of the app's Xcode
//! project. This crate converts such an app to consume React and its
//! dependencies through a generated `ios/Podfile` instead.
//!
//! # Example Usage
//!
//! ```no_run
//! use react_pod::{Converter, ConverterConfig, SystemRunner};
//!
//! let config = ConverterConfig::default().with_repo_update(Some(false));
//! let converter = Converter::new(config, SystemRunner::new(false), "/path/to/app");
//!
//! match converter.convert() {
//!     Ok(outcome) => println!("{:?}", outcome),
//!     Err(e) => eprintln!("Conversion failed: {}", e),
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`converter`]: the conversion and update pipelines
//! - [`xcode`]: `project.pbxproj` reading, editing and writing
//! - [`runner`]: external command execution
//! - [`manifest`]: `package.json`

pub mod cli;
pub mod config;
pub mod converter;
pub mod error;
pub mod manifest;
pub mod runner;
pub mod util;
pub mod xcode;

pub use config::{ConfigError, ConverterConfig};
pub use converter::{ConvertOutcome, Converter, RunState, UpdateOutcome};
pub use error::{ConversionError, Error, ExecutionError, Result};
pub use manifest::PackageManifest;
pub use runner::{CommandRunner, CommandSpec, MockRunner, SystemRunner};
pub use util::{init_from_env, init_logging, LoggingConfig};
pub use xcode::XcodeProject;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
