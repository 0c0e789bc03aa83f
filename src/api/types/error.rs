//! API error types
//!
//! Errors cross the HTTP boundary as `{"statusCode": <n>, "message": "…"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::domain::DomainError;

/// Wire shape of an error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Authentication error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Permission error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Uniqueness conflict
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            status_code: self.status.as_u16(),
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::Credential { message } => Self::unauthorized(message),
            DomainError::Forbidden { message } => Self::forbidden(message),
            DomainError::Conflict { message } => Self::conflict(message),
            DomainError::Configuration { .. }
            | DomainError::Storage { .. }
            | DomainError::Internal { .. } => {
                // Diagnostic detail stays server-side
                error!("Internal failure: {}", err);
                Self::internal("internal server error")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::conflict("Username 'alice' already exists");
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, "Username 'alice' already exists");
    }

    #[test]
    fn test_domain_error_conversion() {
        let api_err: ApiError = DomainError::credential("invalid username or password").into();
        assert_eq!(api_err.status, StatusCode::UNAUTHORIZED);

        let api_err: ApiError = DomainError::forbidden("current password is incorrect").into();
        assert_eq!(api_err.status, StatusCode::FORBIDDEN);

        let api_err: ApiError = DomainError::conflict("taken").into();
        assert_eq!(api_err.status, StatusCode::CONFLICT);

        let api_err: ApiError = DomainError::not_found("gone").into();
        assert_eq!(api_err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_errors_are_generic() {
        let api_err: ApiError = DomainError::storage("connection refused to db:5432").into();

        assert_eq!(api_err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_err.message, "internal server error");
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ApiErrorBody {
            status_code: 401,
            message: "invalid or expired token".to_string(),
        };

        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"statusCode\":401"));
        assert!(json.contains("invalid or expired token"));
    }
}
