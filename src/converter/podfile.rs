//! Podfile generation
//!
//! The template is compiled into the binary and rendered with Handlebars in
//! strict mode, so a placeholder without a value is an error.

use crate::error::ConversionError;
use handlebars::Handlebars;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::info;

pub const TEMPLATE: &str = include_str!("../../assets/templates/Podfile.template");

/// Values substituted into the template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PodfileContext {
    pub app_name: String,
    /// React Native package, relative to `ios/`
    pub react_path: String,
    pub dependencies: Vec<String>,
    pub test_target: Option<String>,
}

#[derive(Serialize)]
struct TemplateData<'a> {
    #[serde(flatten)]
    context: &'a PodfileContext,
    tool_name: &'static str,
    tool_version: &'static str,
}

/// Renders `template` with the context's values
pub fn render(template: &str, context: &PodfileContext) -> Result<String, ConversionError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string("podfile", template)
        .map_err(|e| ConversionError::Template(e.to_string()))?;

    let data = TemplateData {
        context,
        tool_name: crate::NAME,
        tool_version: crate::VERSION,
    };
    handlebars
        .render("podfile", &data)
        .map_err(|e| ConversionError::Template(e.to_string()))
}

/// Renders the bundled template and writes it to `path`, replacing any existing file
pub fn generate(path: &Path, context: &PodfileContext) -> Result<(), ConversionError> {
    info!("Generating {}", path.display());
    let contents = render(TEMPLATE, context)?;
    fs::write(path, contents).map_err(|source| ConversionError::Write {
        path: path.to_path_buf(),
        source,
    })
}
