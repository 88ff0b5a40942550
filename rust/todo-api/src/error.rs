//! Request-level error taxonomy and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::TaskError;
use crate::scheduler::RuleError;

/// Errors surfaced to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Malformed input or a task/rule that fails validation.
    #[error("{0}")]
    Validation(String),

    /// No task with the requested id.
    #[error("{0}")]
    NotFound(String),

    /// Missing, invalid or expired session.
    #[error("{0}")]
    Unauthorized(String),

    /// The record store failed.
    #[error("{0}")]
    Persistence(String),

    /// Any other server-side failure.
    #[error("{0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error for a task id.
    pub fn task_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("task {id} not found"))
    }

    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RuleError> for ApiError {
    fn from(err: RuleError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// Result type for request handlers and the task manager.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::task_not_found(3).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Persistence("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_task_errors_are_validation_errors() {
        let err: ApiError = TaskError::MissingTitle.into();
        assert!(matches!(err, ApiError::Validation(_)));

        let err: ApiError = TaskError::InvalidRule(RuleError::EmptyRule).into();
        assert_eq!(err.to_string(), "invalid repeat rule: repeat rule is empty");
    }

    #[test]
    fn test_into_response_status() {
        let response = ApiError::task_not_found(42).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
