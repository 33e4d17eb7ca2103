//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a handler can produce is one of five kinds: invalid input, failed
//! authentication, a miss on an owned resource, a uniqueness conflict, or an internal
//! fault. Each kind maps to exactly one HTTP status and a JSON body of the form
//! `{"error": "<message>"}`.
//!
//! Internal faults never expose their detail to the client: the detail is logged and
//! the response body is always the same generic message.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Body returned for every `AppError::Internal`.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing input (HTTP 400).
    Validation(String),
    /// Missing, invalid or expired token, or bad credentials (HTTP 401).
    Unauthorized(String),
    /// Owned-resource lookup miss (HTTP 404).
    /// Used both when a record does not exist and when it belongs to someone else.
    NotFound(String),
    /// Uniqueness violation reported by the store (HTTP 400).
    Conflict(String),
    /// Hashing, signing or store failure unrelated to the input (HTTP 500).
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Validation(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => msg.as_str(),
            AppError::Internal(detail) => {
                error!("internal fault: {}", detail);
                INTERNAL_ERROR_MESSAGE
            }
        };
        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

/// Converts `sqlx::Error` into `AppError::Internal`.
///
/// Uniqueness violations are not handled here; the store maps them to
/// `AppError::Conflict` at the statements that can raise them.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        AppError::Internal(format!("database error: {}", error))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::Internal(format!("password hashing failed: {}", error))
    }
}

/// Raised when the blocking thread pool is gone or the closure panicked.
impl From<actix_web::error::BlockingError> for AppError {
    fn from(error: actix_web::error::BlockingError) -> AppError {
        AppError::Internal(format!("blocking task failed: {}", error))
    }
}
