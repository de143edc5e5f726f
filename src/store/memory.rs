//! In-memory store used by tests and local experimentation.
//!
//! Mirrors the PostgreSQL implementation's semantics (soft-delete filters,
//! zero-row mutations, newest-first ordering) over plain vectors guarded by
//! a mutex. Surrogate ids count up from 1, like BIGSERIAL columns would.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    error::AppError,
    models::{
        api_key::{ApiKeyRecord, KeyStatus, NewApiKey},
        usage::{NewUsageRecord, UsageRecord},
    },
    store::Store,
};

#[derive(Debug, Default)]
struct Tables {
    keys: Vec<ApiKeyRecord>,
    usage: Vec<UsageRecord>,
}

/// Store implementation backed by process memory.
#[derive(Debug, Default)]
pub struct MemStore {
    tables: Mutex<Tables>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every usage record in insertion order, whatever key it belongs to.
    ///
    /// Lets tests assert the exactly-one-record-per-attempt property,
    /// including records with no key id.
    pub async fn all_usage(&self) -> Vec<UsageRecord> {
        self.tables.lock().await.usage.clone()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn insert_key(&self, new_key: NewApiKey) -> Result<ApiKeyRecord, AppError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let record = ApiKeyRecord {
            id: tables.keys.len() as i64 + 1,
            secret_verifier: new_key.secret_verifier,
            salt: new_key.salt,
            owner: new_key.owner,
            scopes: new_key.scopes,
            status: KeyStatus::Active.as_str().to_string(),
            expiration: new_key.expiration,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.keys.push(record.clone());
        Ok(record)
    }

    async fn list_keys(&self) -> Result<Vec<ApiKeyRecord>, AppError> {
        let tables = self.tables.lock().await;
        let mut records: Vec<ApiKeyRecord> = tables
            .keys
            .iter()
            .filter(|key| key.deleted_at.is_none())
            .cloned()
            .collect();
        records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(records)
    }

    async fn find_key(&self, id: i64) -> Result<Option<ApiKeyRecord>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.keys.iter().find(|key| key.id == id).cloned())
    }

    async fn revoke_key(&self, id: i64) -> Result<Option<ApiKeyRecord>, AppError> {
        let mut tables = self.tables.lock().await;
        let record = tables
            .keys
            .iter_mut()
            .find(|key| key.id == id && key.deleted_at.is_none());

        Ok(record.map(|key| {
            key.status = KeyStatus::Revoked.as_str().to_string();
            key.updated_at = Utc::now();
            key.clone()
        }))
    }

    async fn soft_delete_key(&self, id: i64) -> Result<Option<ApiKeyRecord>, AppError> {
        let mut tables = self.tables.lock().await;
        let record = tables
            .keys
            .iter_mut()
            .find(|key| key.id == id && key.deleted_at.is_none());

        Ok(record.map(|key| {
            let now = Utc::now();
            key.deleted_at = Some(now);
            key.updated_at = now;
            key.clone()
        }))
    }

    async fn insert_usage(&self, entry: NewUsageRecord) -> Result<UsageRecord, AppError> {
        let mut tables = self.tables.lock().await;
        let record = UsageRecord {
            id: tables.usage.len() as i64 + 1,
            api_key_id: entry.api_key_id,
            timestamp: Utc::now(),
            action: entry.action,
            endpoint: entry.endpoint,
            ip: entry.ip,
            user_agent: entry.user_agent,
            metadata: entry.metadata,
        };
        tables.usage.push(record.clone());
        Ok(record)
    }

    async fn usage_for_key(&self, api_key_id: i64) -> Result<Vec<UsageRecord>, AppError> {
        let tables = self.tables.lock().await;
        let mut records: Vec<UsageRecord> = tables
            .usage
            .iter()
            .filter(|entry| entry.api_key_id == Some(api_key_id))
            .cloned()
            .collect();
        records.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
        Ok(records)
    }
}
