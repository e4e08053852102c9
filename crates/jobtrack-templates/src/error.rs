//! Error types for template catalog operations.

use std::path::PathBuf;

use jobtrack_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    /// The caller named a template the catalog does not hold.
    #[error("template not found: {id}")]
    TemplateNotFound { id: String },

    #[error("invalid template '{id}': {reason}")]
    InvalidTemplate { id: String, reason: String },

    #[error("duplicate template id: {id}")]
    DuplicateTemplateId { id: String },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write CSV: {message}")]
    Csv { message: String },
}

impl TemplateError {
    pub(crate) fn not_found(id: &str) -> Self {
        Self::TemplateNotFound { id: id.to_string() }
    }
}

impl From<ModelError> for TemplateError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidTemplate { id, reason } => Self::InvalidTemplate { id, reason },
            other => Self::InvalidTemplate {
                id: String::new(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<csv::Error> for TemplateError {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TemplateError>;
