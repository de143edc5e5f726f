//! API key issuance, validation, and audit service.
//!
//! Issues opaque bearer credentials scoped to `resource:action` capability
//! strings, validates presented credentials against a required scope, and
//! records every validation attempt in an append-only audit trail.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx, behind an injected `Store` trait
//! - **Secrets**: per-key salted scrypt verifiers; plaintext never stored
//! - **Format**: JSON requests/responses
//!
//! The library target exists so integration tests can build the production
//! router over the in-memory store without a running database.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use routes::{AppState, create_router};
