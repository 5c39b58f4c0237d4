//! Business logic on top of the repository traits.
//!
//! Each submodule owns one domain area and enforces role scoping: tenants
//! only see and touch their own records, staff see everything. Handlers call
//! these functions with the authenticated [`crate::models::User`] as the
//! actor; nothing here touches HTTP types.

pub mod contracts;
pub mod dashboard;
pub mod laundry;
pub mod payments;
pub mod property;
pub mod users;

use crate::db::repository::RepositoryError;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors surfaced by the service layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input failed a business rule check.
    #[error("validation error: {0}")]
    Validation(String),

    /// The actor is not allowed to perform this operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The requested entity does not exist (or is hidden from the actor).
    #[error("not found: {0}")]
    NotFound(String),

    /// The operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage layer failure.
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { message, context } => {
                ServiceError::NotFound(format!("{} {}", message, context))
            }
            RepositoryError::Conflict { message, .. } => ServiceError::Conflict(message),
            other => ServiceError::Repository(other),
        }
    }
}

impl ServiceError {
    pub fn validation(message: impl Into<String>) -> Self {
        ServiceError::Validation(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ServiceError::Forbidden(message.into())
    }
}
