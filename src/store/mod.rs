//! Persistence layer behind a trait seam.
//!
//! The engine and handlers never talk to a concrete database type; they hold
//! an injected `Arc<dyn Store>`. Production wires in [`postgres::PgStore`],
//! tests substitute [`memory::MemStore`] so no database is required.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        api_key::{ApiKeyRecord, NewApiKey},
        usage::{NewUsageRecord, UsageRecord},
    },
};

/// Shared handle to a store implementation.
pub type DynStore = Arc<dyn Store>;

/// Durable storage for API key records and their append-only usage trail.
///
/// Mutations are single-row operations; atomicity is the store's own
/// concern. Returning `Ok(None)` from a mutation means zero rows matched,
/// which callers surface as a not-found condition.
#[async_trait]
pub trait Store: Send + Sync {
    /// Persist a new key record with status "active" and fresh timestamps.
    async fn insert_key(&self, new_key: NewApiKey) -> Result<ApiKeyRecord, AppError>;

    /// All records that are not soft-deleted, newest first by creation time.
    ///
    /// Serves both the listing endpoint and the validation scan; revoked and
    /// expired keys are included so validation can name the denial reason.
    async fn list_keys(&self) -> Result<Vec<ApiKeyRecord>, AppError>;

    /// Look up a record by id, including soft-deleted ones.
    ///
    /// Used by the usage query, which must keep answering for deleted keys.
    async fn find_key(&self, id: i64) -> Result<Option<ApiKeyRecord>, AppError>;

    /// Transition a non-deleted key to "revoked" and refresh `updated_at`.
    ///
    /// Absent and soft-deleted ids both come back as `None`.
    async fn revoke_key(&self, id: i64) -> Result<Option<ApiKeyRecord>, AppError>;

    /// Set `deleted_at` on a key that is not yet deleted.
    ///
    /// `None` when the id is absent or the key was already deleted.
    async fn soft_delete_key(&self, id: i64) -> Result<Option<ApiKeyRecord>, AppError>;

    /// Append one usage record. Usage rows are never updated or removed.
    async fn insert_usage(&self, entry: NewUsageRecord) -> Result<UsageRecord, AppError>;

    /// All usage records for a key id, newest first.
    ///
    /// An unknown id simply yields an empty list.
    async fn usage_for_key(&self, api_key_id: i64) -> Result<Vec<UsageRecord>, AppError>;
}
