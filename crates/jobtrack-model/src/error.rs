use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid template '{id}': {reason}")]
    InvalidTemplate { id: String, reason: String },
    #[error("unknown canonical field: {0}")]
    UnknownField(String),
    #[error("unknown resolution action: {0}")]
    UnknownAction(String),
}

impl ModelError {
    pub(crate) fn invalid_template(id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;
