//! User-defined templates loaded from a TOML file.
//!
//! ```toml
//! [[templates]]
//! id = "notion"
//! name = "Notion board"
//! source = "custom"
//!
//! [[templates.mappings]]
//! csvColumn = "Org"
//! canonicalField = "company"
//! required = true
//! ```

use std::path::Path;

use jobtrack_model::Template;
use serde::Deserialize;

use crate::error::{Result, TemplateError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CustomTemplateFile {
    #[serde(default)]
    templates: Vec<Template>,
}

/// Reads and validates every template in a TOML file.
pub fn load_custom_templates(path: &Path) -> Result<Vec<Template>> {
    let contents = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_custom_templates(&contents, path)
}

/// Parses templates from TOML text; `path` is only used for error context.
pub fn parse_custom_templates(contents: &str, path: &Path) -> Result<Vec<Template>> {
    let file: CustomTemplateFile = toml::from_str(contents).map_err(|source| TemplateError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    for template in &file.templates {
        template.validate()?;
    }
    Ok(file.templates)
}
