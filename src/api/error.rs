// src/api/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::error::StoreError;

/// Standard API error response format
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: Option<String>,
}

impl ApiError {
    fn with_code(status_code: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code: Some(code.to_string()),
        }
    }

    /// Create a new internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    /// Create a new bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Create a new not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Create a new unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// Create a new forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// Create a new conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::CONFLICT, "CONFLICT", message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response_json = json!({
            "error": true,
            "message": self.message,
            "status": self.status_code.as_u16()
        });

        if let Some(error_code) = self.error_code {
            response_json["error_code"] = json!(error_code);
        }

        (self.status_code, Json(response_json)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => ApiError::conflict(message),
            StoreError::Invalid(message) => ApiError::bad_request(message),
            StoreError::Database(e) => {
                error!("Database error: {:?}", e);
                ApiError::internal("Database error")
            }
            StoreError::Serialization(e) => {
                error!("Serialization error: {:?}", e);
                ApiError::internal("Serialization error")
            }
            StoreError::Corrupt(detail) => {
                error!("Corrupt row: {}", detail);
                ApiError::internal("Database error")
            }
        }
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Extension trait for Option<T> to create ApiError for None cases
pub trait IntoApiErrorOption<T> {
    fn ok_or_not_found(self, message: &str) -> Result<T, ApiError>;
}

impl<T> IntoApiErrorOption<T> for Option<T> {
    fn ok_or_not_found(self, message: &str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::not_found(message))
    }
}

/// Helper function for validation errors
pub fn validation_error(field: &str, reason: &str) -> ApiError {
    ApiError::bad_request(format!("Validation failed for {field}: {reason}"))
}

/// Helper function for invalid parameter errors
pub fn invalid_param_error(param_name: &str, reason: &str) -> ApiError {
    ApiError::bad_request(format!("Invalid parameter '{param_name}': {reason}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_api_error_creation() {
        let error = ApiError::internal("Test error");
        assert_eq!(error.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.message, "Test error");
    }

    #[test]
    fn test_option_extensions() {
        let none_value: Option<i32> = None;
        let error = none_value.ok_or_not_found("Item not found").unwrap_err();

        assert_eq!(error.status_code, StatusCode::NOT_FOUND);
        assert_eq!(error.message, "Item not found");
    }

    #[test]
    fn test_store_error_mapping() {
        let conflict: ApiError = StoreError::conflict("Already registered").into();
        assert_eq!(conflict.status_code, StatusCode::CONFLICT);
        assert_eq!(conflict.message, "Already registered");

        let invalid: ApiError = StoreError::invalid("title must not be empty").into();
        assert_eq!(invalid.status_code, StatusCode::BAD_REQUEST);

        let db: ApiError = StoreError::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(db.status_code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(db.message, "Database error");
    }

    #[test]
    fn test_helper_functions() {
        let error = validation_error("rating", "must be between 1 and 5");
        assert_eq!(error.status_code, StatusCode::BAD_REQUEST);
        assert!(error.message.contains("rating"));

        let error = invalid_param_error("status", "unknown value");
        assert!(error.message.contains("'status'"));
    }
}
