//! Error taxonomy shared by the validator, the registration service and the API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default `name` carried by every [`AppError`].
pub const APP_ERROR_NAME: &str = "AppError";

/// Symbolic failure code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Email or phone already registered
    Duplicate,
    /// Field-level violations in the submitted form
    Validation,
    /// Anything else, including an unreachable member store
    Unknown,
}

impl ErrorCode {
    /// Status used when an error is built without an explicit one.
    pub fn default_status(self) -> u16 {
        match self {
            ErrorCode::Duplicate => 409,
            ErrorCode::Validation => 400,
            ErrorCode::Unknown => 500,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Duplicate => "DUPLICATE",
            ErrorCode::Validation => "VALIDATION",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, user-facing failure.
///
/// Serializes to `{ message, code, statusCode, name }` so it can cross a
/// process boundary and be rebuilt with the same code and message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct AppError {
    pub message: String,
    pub code: ErrorCode,
    pub status_code: u16,
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_name() -> String {
    APP_ERROR_NAME.into()
}

impl AppError {
    /// Build an error with the code's default status.
    pub fn new(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            code,
            status_code: code.default_status(),
            name: default_name(),
        }
    }

    /// Override the status.
    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCode::Duplicate)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCode::Validation)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(message, ErrorCode::Unknown)
    }

    /// Too many attempts. The taxonomy has no code of its own for this, so it
    /// is UNKNOWN with status 429.
    pub fn throttled(message: impl Into<String>) -> Self {
        Self::unknown(message).with_status(429)
    }

    /// Plain structured form of this error.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "message": self.message,
            "code": self.code,
            "statusCode": self.status_code,
            "name": self.name,
        })
    }

    /// Rebuild an error from its structured form.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The HTTP status, falling back to 500 for out-of-range values.
    pub fn http_status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Caller-facing error body: message and code only.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            message: self.message.clone(),
            code: self.code,
        }
    }
}

/// The `error` member of a failed sign-up response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    pub code: ErrorCode,
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorBody,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            success: false,
            error: self.body(),
        };

        let mut response = (self.http_status(), Json(body)).into_response();
        response.extensions_mut().insert(self.code);
        response
    }
}
