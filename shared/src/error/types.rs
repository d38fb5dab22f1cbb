//! `AppError` and its JSON envelope

use std::collections::HashMap;

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::category::ErrorCategory;
use super::codes::ErrorCode;

/// Error returned to HTTP clients
///
/// `details` carries machine-readable context such as the offending `field`
/// or the id of the resource involved.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// `"<field> required"` with the field name in `details.field`
    pub fn required(field: &str) -> Self {
        Self::with_message(ErrorCode::RequiredField, format!("{field} required"))
            .with_detail("field", field)
    }

    /// Request body could not be read as the expected JSON
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }
}

/// JSON body of every error response
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<AppError> for ApiResponse {
    fn from(err: AppError) -> Self {
        Self {
            code: err.code,
            message: err.message,
            details: err.details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error");
        }
        (self.http_status(), Json(ApiResponse::from(self))).into_response()
    }
}
