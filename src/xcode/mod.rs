//! Xcode project documents
//!
//! - [`plist`]: the OpenStep property-list dialect `project.pbxproj` is written in
//! - [`XcodeProject`]: typed queries and mutations over the object table

pub mod plist;
mod project;
mod writer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use plist::{Dict, PlistError, Value};
pub use project::{
    ProjectError, ShellScriptPhase, Target, XcodeProject, APPLICATION_PRODUCT_TYPE,
    UNIT_TEST_PRODUCT_TYPE,
};
