//! Usage record data model and response types.
//!
//! Every validation attempt, allowed or not, produces exactly one usage
//! record. Records are append-only: created once, never mutated or deleted,
//! and they outlive soft-deleted keys so audit history stays intact.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Represents one audit entry from the database.
///
/// # Database Table
///
/// Maps to the `usage_records` table. `api_key_id` is NULL only when the
/// presented secret matched no record, so even failed guesses leave a trail.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UsageRecord {
    /// Surrogate identifier assigned by the store
    pub id: i64,

    /// The key this attempt resolved to; None when no key matched
    pub api_key_id: Option<i64>,

    /// When the attempt happened
    pub timestamp: DateTime<Utc>,

    /// What was attempted (currently always "validate")
    pub action: String,

    /// The endpoint the attempt arrived on
    pub endpoint: String,

    /// Caller IP address, or "unknown"
    pub ip: String,

    /// Caller User-Agent header, or "unknown"
    pub user_agent: String,

    /// Free-form context: `{service, scope, result}`
    pub metadata: serde_json::Value,
}

/// Fields for appending a new usage record.
///
/// The store assigns `id` and `timestamp`.
#[derive(Debug, Clone)]
pub struct NewUsageRecord {
    pub api_key_id: Option<i64>,
    pub action: String,
    pub endpoint: String,
    pub ip: String,
    pub user_agent: String,
    pub metadata: serde_json::Value,
}

/// One usage record as returned by the usage history endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecordResponse {
    pub id: i64,
    pub api_key_id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub endpoint: String,
    pub ip: String,
    pub user_agent: String,
    pub metadata: serde_json::Value,
}

impl From<UsageRecord> for UsageRecordResponse {
    fn from(record: UsageRecord) -> Self {
        Self {
            id: record.id,
            api_key_id: record.api_key_id,
            timestamp: record.timestamp,
            action: record.action,
            endpoint: record.endpoint,
            ip: record.ip,
            user_agent: record.user_agent,
            metadata: record.metadata,
        }
    }
}

/// Key context joined into the usage history response.
///
/// Present even for soft-deleted keys, so auditors can see who owned a key
/// and when it disappeared.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageKeyInfo {
    pub owner: String,
    pub status: String,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Response body for `GET /api-keys/{id}/usage`.
///
/// # JSON Example
///
/// ```json
/// {
///   "keyId": 1,
///   "totalRequests": 2,
///   "keyInfo": { "owner": "billing-service", "status": "active", "deletedAt": null },
///   "records": [
///     {
///       "id": 7,
///       "apiKeyId": 1,
///       "timestamp": "2026-08-21T10:00:00Z",
///       "action": "validate",
///       "endpoint": "/validate",
///       "ip": "10.0.0.9",
///       "userAgent": "curl/8.5.0",
///       "metadata": { "service": "orders", "scope": "orders:read", "result": "allowed" }
///     }
///   ]
/// }
/// ```
///
/// An id with no recorded usage yields `totalRequests: 0` and an empty
/// `records` array, not an error. `keyInfo` is null when no key row exists
/// for the id at all.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageHistoryResponse {
    pub key_id: i64,
    pub total_requests: usize,
    pub key_info: Option<UsageKeyInfo>,
    pub records: Vec<UsageRecordResponse>,
}
