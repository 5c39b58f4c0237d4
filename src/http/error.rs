//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::ServiceError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Invalid request (validation error)
    BadRequest(String),
    /// Missing or invalid credentials
    Unauthorized(String),
    /// Authenticated but not allowed
    Forbidden(String),
    /// Resource not found
    NotFound(String),
    /// Conflicts with existing state
    Conflict(String),
    /// Internal server error
    Internal(String),
    /// Repository error
    Repository(crate::db::repository::RepositoryError),
}

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiErrorBody::new("BAD_REQUEST", msg))
            }
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, ApiErrorBody::new("UNAUTHORIZED", msg))
            }
            ApiError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, ApiErrorBody::new("FORBIDDEN", msg))
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, ApiErrorBody::new("NOT_FOUND", msg))
            }
            ApiError::Conflict(msg) => {
                (StatusCode::CONFLICT, ApiErrorBody::new("CONFLICT", msg))
            }
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody::new("INTERNAL_ERROR", msg),
            ),
            ApiError::Repository(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody::new("REPOSITORY_ERROR", e.to_string()),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => ApiError::BadRequest(msg),
            ServiceError::Forbidden(msg) => ApiError::Forbidden(msg),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::Conflict(msg) => ApiError::Conflict(msg),
            ServiceError::Repository(e) => ApiError::Repository(e),
        }
    }
}

impl From<crate::db::repository::RepositoryError> for ApiError {
    fn from(err: crate::db::repository::RepositoryError) -> Self {
        ApiError::Repository(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceError;

    #[test]
    fn test_service_error_mapping() {
        let cases = [
            (ServiceError::Validation("v".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Forbidden("f".into()), StatusCode::FORBIDDEN),
            (ServiceError::NotFound("n".into()), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("c".into()), StatusCode::CONFLICT),
        ];
        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_unauthorized_status() {
        let response = ApiError::unauthorized("no token").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
