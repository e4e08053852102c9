//! Error types for duplicate resolution and import sessions.

use jobtrack_map::MappingError;
use jobtrack_model::ResolutionKind;
use jobtrack_templates::TemplateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("unknown duplicate group: {id}")]
    UnknownGroup { id: String },

    #[error("duplicate group {id} is already resolved as {action}")]
    GroupAlreadyResolved { id: String, action: ResolutionKind },

    #[error("invalid member index for group {id}: {reason}")]
    InvalidMemberIndex { id: String, reason: String },

    /// `finalize` was called while some groups still await a decision.
    #[error("{remaining} duplicate group(s) unresolved, first: {first}")]
    Unresolved { remaining: usize, first: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// No template cleared the detection floor and none was named.
    #[error("no template matched the upload (best confidence {confidence:.2})")]
    NoTemplateDetected { confidence: f64 },

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("record store error: {message}")]
    Store { message: String },
}

impl ReconcileError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_member(id: &str, reason: impl Into<String>) -> Self {
        Self::InvalidMemberIndex {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
