//! Router construction and shared application state.
//!
//! The router is built by a free function over [`AppState`] so integration
//! tests can drive the exact production routing with an in-memory store and
//! `tower::ServiceExt::oneshot`, no network or database required.

use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers,
    services::{usage_recorder::UsageRecorder, validation::ValidationEngine},
    store::DynStore,
};

/// State shared with every handler.
///
/// Holds the injected store and the validation engine wired over it. Cloning
/// is cheap: the store is an `Arc` and the engine only holds clones of it.
#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub engine: ValidationEngine,
}

impl AppState {
    /// Wire the engine and recorder over a store implementation.
    pub fn new(store: DynStore) -> Self {
        let recorder = UsageRecorder::new(store.clone());
        let engine = ValidationEngine::new(store.clone(), recorder);
        Self { store, engine }
    }
}

/// Build the application router.
///
/// # Routes
///
/// - `GET /health` - Liveness check
/// - `POST /api-keys` - Issue a new key
/// - `GET /api-keys` - List non-deleted keys
/// - `PATCH /api-keys/{id}` - Revoke a key
/// - `DELETE /api-keys/{id}` - Soft-delete a key
/// - `GET /api-keys/{id}/usage` - Audit history for a key
/// - `POST /validate` - Validate a presented key against a scope
///
/// `TraceLayer` logs every request; the permissive CORS layer lets browser
/// dashboards call the listing and usage endpoints directly.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/api-keys", post(handlers::api_keys::issue_key))
        .route("/api-keys", get(handlers::api_keys::list_keys))
        .route("/api-keys/{id}", patch(handlers::api_keys::revoke_key))
        .route("/api-keys/{id}", delete(handlers::api_keys::delete_key))
        .route("/api-keys/{id}/usage", get(handlers::api_keys::key_usage))
        .route("/validate", post(handlers::validate::validate_key))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
