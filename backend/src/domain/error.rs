//! Error type shared by all domain services.

use thiserror::Error;

use crate::storage::traits::IntegrityError;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Storage error: {0}")]
    Storage(anyhow::Error),
}

impl From<IntegrityError> for DomainError {
    fn from(err: IntegrityError) -> Self {
        let message = err.to_string();
        match err {
            IntegrityError::MissingTrainer(_) | IntegrityError::MissingTrainingType(_) => {
                DomainError::Validation(message)
            }
            IntegrityError::DuplicateUsername(_)
            | IntegrityError::LastAdmin
            | IntegrityError::DuplicateTrainingTypeName(_)
            | IntegrityError::DuplicateAutoSection { .. } => DomainError::Conflict(message),
        }
    }
}

/// Integrity violations raised inside a store write keep their meaning,
/// anything else is a storage failure
impl From<anyhow::Error> for DomainError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<IntegrityError>() {
            Ok(violation) => violation.into(),
            Err(err) => DomainError::Storage(err),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn not_found(kind: &str, id: &str) -> Self {
        DomainError::NotFound(format!("{} {}", kind, id))
    }
}
