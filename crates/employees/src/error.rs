use thiserror::Error;

use staffdesk_core::DomainError;

use crate::{AssetError, ProtectError};

pub type EmployeeResult<T> = Result<T, EmployeeError>;

#[derive(Debug, Error)]
pub enum EmployeeError {
    /// No employee behind this id or token.
    #[error("{0}")]
    NotFound(String),

    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("photo storage failed: {0}")]
    Asset(#[from] AssetError),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl EmployeeError {
    pub fn not_found(id: &str) -> Self {
        Self::NotFound(format!("Employee with Id = {id} cannot be found"))
    }

    /// A token that does not decode names no employee.
    pub(crate) fn bad_token(token: &str, err: ProtectError) -> Self {
        tracing::debug!(error = %err, "employee token rejected");
        Self::not_found(token)
    }
}

impl From<DomainError> for EmployeeError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msgs) => Self::Validation(msgs),
            DomainError::NotFound => Self::NotFound("Employee record no longer exists".to_string()),
            err @ DomainError::InvalidId(_) => Self::NotFound(err.to_string()),
            other => Self::Unexpected(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_requested_id() {
        assert_eq!(EmployeeError::not_found("abc").to_string(), "Employee with Id = abc cannot be found");
    }

    #[test]
    fn vanished_record_does_not_invent_an_id() {
        let message = EmployeeError::from(DomainError::NotFound).to_string();
        assert_eq!(message, "Employee record no longer exists");
        assert!(!message.contains("Id ="));
    }
}
