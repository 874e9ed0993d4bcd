//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// This is what the directory and repository facades report. Workflow layers
/// translate it into their own user-facing taxonomy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more values were rejected (e.g. duplicate role name).
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found.
    #[error("not found")]
    NotFound,

    /// A delete was blocked by dependent records.
    #[error("referential constraint: {0}")]
    ReferentialConstraint(String),

    /// Backend failure that is not one of the above.
    #[error("unexpected: {0}")]
    Unexpected(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(vec![msg.into()])
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn referential(msg: impl Into<String>) -> Self {
        Self::ReferentialConstraint(msg.into())
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Messages suitable for showing next to a re-presented form.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation(msgs) => msgs.clone(),
            other => vec![other.to_string()],
        }
    }
}
