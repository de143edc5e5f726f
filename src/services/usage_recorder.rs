//! Best-effort audit writes.
//!
//! The recorder sits between the validation engine and the store so the
//! audit side effect has one owner and one failure mode: a write that fails
//! is reported to the operational log and nowhere else. It is never retried
//! and it never turns an already-computed decision into an error.

use crate::{models::usage::NewUsageRecord, store::DynStore};

/// Appends audit entries for validation attempts.
#[derive(Clone)]
pub struct UsageRecorder {
    store: DynStore,
}

impl UsageRecorder {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Append one audit entry. Single attempt, failure swallowed.
    ///
    /// The entry carries no secret material, so logging the failure is safe.
    pub async fn record(&self, entry: NewUsageRecord) {
        if let Err(err) = self.store.insert_usage(entry).await {
            tracing::warn!("Failed to record usage entry: {}", err);
        }
    }
}
