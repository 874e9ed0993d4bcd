use thiserror::Error;

use staffdesk_auth::AuthzError;
use staffdesk_core::DomainError;

pub type AdminResult<T> = Result<T, AdminError>;

/// Outcome taxonomy of an administration workflow.
///
/// Everything except `Unexpected` is a normal, recoverable control-flow
/// result that the caller renders.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    /// The addressed role/user does not exist (or the id cannot name one).
    #[error("{0}")]
    NotFound(String),

    /// Input was rejected; re-present the form with these messages.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A delete was blocked by dependent records.
    #[error("{title}: {message}")]
    ReferentialConstraint { title: String, message: String },

    /// The policy evaluator said no.
    #[error(transparent)]
    Unauthorized(#[from] AuthzError),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AdminError {
    pub fn role_not_found(id: impl core::fmt::Display) -> Self {
        Self::NotFound(format!("Role with Id = {id} cannot be found"))
    }

    pub fn user_not_found(id: impl core::fmt::Display) -> Self {
        Self::NotFound(format!("User with Id = {id} cannot be found"))
    }

    /// A bulk step failed; keep the summary line ahead of facade messages.
    pub(crate) fn step_failed(summary: &str, err: DomainError) -> Self {
        match err {
            DomainError::Validation(msgs) => {
                let mut all = Vec::with_capacity(msgs.len() + 1);
                all.push(summary.to_string());
                all.extend(msgs);
                Self::Validation(all)
            }
            other => other.into(),
        }
    }
}

impl From<DomainError> for AdminError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msgs) => Self::Validation(msgs),
            DomainError::NotFound => Self::NotFound("The record no longer exists".to_string()),
            DomainError::InvalidId(msg) => Self::NotFound(msg),
            DomainError::ReferentialConstraint(msg) => Self::ReferentialConstraint {
                title: "Record is in use".to_string(),
                message: msg,
            },
            DomainError::Unexpected(msg) => {
                tracing::error!(error = %msg, "directory failure");
                Self::Unexpected(msg)
            }
        }
    }
}
