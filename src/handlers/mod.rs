//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Performs business logic (store operations, validation)
//! 3. Returns HTTP response (JSON, status code)

/// API key lifecycle endpoints (issue, list, revoke, delete, usage)
pub mod api_keys;
/// Liveness check endpoint
pub mod health;
/// Key validation endpoint
pub mod validate;
