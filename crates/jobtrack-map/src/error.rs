use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Mapping was requested against a template id the catalog does not hold.
    #[error("template not found: {id}")]
    TemplateNotFound { id: String },
}

pub type Result<T> = std::result::Result<T, MappingError>;
