//! PostgreSQL store implementation backed by the sqlx connection pool.
//!
//! Columns are always listed explicitly so the row mapping stays stable, and
//! the verifier/salt columns never travel further than the callers that need
//! them for recomputation.

use async_trait::async_trait;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        api_key::{ApiKeyRecord, KeyStatus, NewApiKey},
        usage::{NewUsageRecord, UsageRecord},
    },
    store::Store,
};

/// All columns of `api_keys`, in record-field order.
const KEY_COLUMNS: &str =
    "id, secret_verifier, salt, owner, scopes, status, expiration, created_at, updated_at, deleted_at";

/// All columns of `usage_records`. "timestamp" is quoted because it doubles
/// as a SQL keyword.
const USAGE_COLUMNS: &str =
    "id, api_key_id, \"timestamp\", action, endpoint, ip, user_agent, metadata";

/// Store implementation over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_key(&self, new_key: NewApiKey) -> Result<ApiKeyRecord, AppError> {
        let record = sqlx::query_as::<_, ApiKeyRecord>(&format!(
            r#"
            INSERT INTO api_keys (owner, secret_verifier, salt, scopes, expiration)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {KEY_COLUMNS}
            "#,
        ))
        .bind(new_key.owner)
        .bind(new_key.secret_verifier)
        .bind(new_key.salt)
        .bind(new_key.scopes)
        .bind(new_key.expiration)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_keys(&self) -> Result<Vec<ApiKeyRecord>, AppError> {
        let records = sqlx::query_as::<_, ApiKeyRecord>(&format!(
            r#"
            SELECT {KEY_COLUMNS}
            FROM api_keys
            WHERE deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            "#,
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn find_key(&self, id: i64) -> Result<Option<ApiKeyRecord>, AppError> {
        // No deleted_at filter: the audit surface sees deleted keys too
        let record = sqlx::query_as::<_, ApiKeyRecord>(&format!(
            "SELECT {KEY_COLUMNS} FROM api_keys WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn revoke_key(&self, id: i64) -> Result<Option<ApiKeyRecord>, AppError> {
        // Zero rows updated means the id is absent or soft-deleted
        let record = sqlx::query_as::<_, ApiKeyRecord>(&format!(
            r#"
            UPDATE api_keys
            SET status = $2,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {KEY_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(KeyStatus::Revoked.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn soft_delete_key(&self, id: i64) -> Result<Option<ApiKeyRecord>, AppError> {
        // The deleted_at guard makes a second delete a zero-row update
        let record = sqlx::query_as::<_, ApiKeyRecord>(&format!(
            r#"
            UPDATE api_keys
            SET deleted_at = NOW(),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {KEY_COLUMNS}
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn insert_usage(&self, entry: NewUsageRecord) -> Result<UsageRecord, AppError> {
        let record = sqlx::query_as::<_, UsageRecord>(&format!(
            r#"
            INSERT INTO usage_records (api_key_id, action, endpoint, ip, user_agent, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USAGE_COLUMNS}
            "#,
        ))
        .bind(entry.api_key_id)
        .bind(entry.action)
        .bind(entry.endpoint)
        .bind(entry.ip)
        .bind(entry.user_agent)
        .bind(entry.metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn usage_for_key(&self, api_key_id: i64) -> Result<Vec<UsageRecord>, AppError> {
        let records = sqlx::query_as::<_, UsageRecord>(&format!(
            r#"
            SELECT {USAGE_COLUMNS}
            FROM usage_records
            WHERE api_key_id = $1
            ORDER BY "timestamp" DESC, id DESC
            "#,
        ))
        .bind(api_key_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
