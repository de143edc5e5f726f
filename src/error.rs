//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Caller errors**: missing or malformed request fields (400)
/// - **Not-found conditions**: operations targeting absent or already
///   soft-deleted keys (404)
/// - **Internal errors**: database failures, key derivation failures (500)
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    ///
    /// Wraps any sqlx::Error via `#[from]`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request. The String describes what was invalid
    /// (e.g., "Owner is required", a malformed scope, a missing field).
    #[error("{0}")]
    InvalidRequest(String),

    /// The targeted API key does not exist or is soft-deleted.
    ///
    /// Returns HTTP 404 Not Found. Soft-deleted and absent ids are not
    /// distinguished for mutations.
    #[error("API key not found")]
    KeyNotFound,

    /// Delete was attempted on a key that is absent or already deleted.
    ///
    /// Returns HTTP 404 Not Found with the delete-specific message.
    #[error("API key not found or already deleted")]
    AlreadyDeleted,

    /// Non-database internal failure (e.g., key derivation error).
    ///
    /// Returns HTTP 500 with a generic message; the detail goes only to the
    /// operational log and never includes secret material.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convert AppError into an HTTP response.
///
/// This implementation lets handlers return `Result<T, AppError>` and have
/// errors converted to proper HTTP responses automatically.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// # Status Code Mapping
///
/// - `InvalidRequest` → 400 Bad Request
/// - `KeyNotFound` / `AlreadyDeleted` → 404 Not Found
/// - `Database` / `Internal` → 500 Internal Server Error (details are logged,
///   never sent to the client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::KeyNotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::AlreadyDeleted => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::Database(ref err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Internal(ref detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        // Build JSON response body
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
