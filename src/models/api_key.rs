//! API key data model and request/response types.
//!
//! An API key is an opaque bearer credential scoped to `resource:action`
//! capability strings. Only a salted scrypt verifier of the secret is stored;
//! the plaintext is returned exactly once, at creation time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an API key.
///
/// The only permitted transition is `Active` → `Revoked`. There is no way
/// back: revocation is final, and soft deletion hides the record entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    Active,
    Revoked,
}

impl KeyStatus {
    /// Database/wire representation of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            KeyStatus::Active => "active",
            KeyStatus::Revoked => "revoked",
        }
    }
}

/// Represents an API key record from the database.
///
/// # Database Table
///
/// Maps to the `api_keys` table with columns:
/// - `id`: surrogate identifier assigned by the store (BIGSERIAL)
/// - `secret_verifier`: hex-encoded scrypt output of (secret, salt)
/// - `salt`: hex-encoded random salt, unique per key
/// - `owner`: opaque identity of the credential holder
/// - `scopes`: capability strings, each in `resource:action` form
/// - `status`: "active" or "revoked"
/// - `expiration`: optional absolute expiry; NULL means never expires
/// - `created_at` / `updated_at`: `updated_at` refreshed on every mutation
/// - `deleted_at`: soft-deletion marker; set once, never cleared
///
/// # Secret Storage
///
/// The plaintext secret is never stored. Verification recomputes the scrypt
/// verifier from a presented secret and this record's salt, so there is no
/// direct index from secret to record and lookups are full scans.
///
/// A record with `deleted_at` set is invisible to validation and listing but
/// is retained so its usage history stays queryable.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKeyRecord {
    /// Surrogate identifier assigned by the store
    pub id: i64,

    /// Hex-encoded scrypt verifier (128 hex characters for 64 output bytes)
    pub secret_verifier: String,

    /// Hex-encoded per-key salt (32 hex characters for 16 random bytes)
    pub salt: String,

    /// Opaque identity of the credential holder
    pub owner: String,

    /// Capability strings granted to this key (set semantics)
    pub scopes: Vec<String>,

    /// Lifecycle status: "active" or "revoked"
    pub status: String,

    /// Optional absolute expiry; None means the key never expires
    pub expiration: Option<DateTime<Utc>>,

    /// When the key was created
    pub created_at: DateTime<Utc>,

    /// When the key was last mutated (status change or deletion)
    pub updated_at: DateTime<Utc>,

    /// Soft-deletion timestamp; None while the key is visible
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ApiKeyRecord {
    /// Whether the key is in the active status.
    pub fn is_active(&self) -> bool {
        self.status == KeyStatus::Active.as_str()
    }

    /// Whether the key's expiration lies strictly before `now`.
    ///
    /// A key with no expiration never expires. A key expiring exactly at
    /// `now` is still considered live.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|expiration| expiration < now)
    }

    /// Whether `scope` is an element of this key's scope set.
    ///
    /// Comparison is exact string equality; there are no wildcard or
    /// hierarchy semantics.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// Fields for inserting a new API key record.
///
/// The store assigns `id`, both timestamps, and the initial "active" status.
#[derive(Debug, Clone)]
pub struct NewApiKey {
    pub owner: String,
    pub secret_verifier: String,
    pub salt: String,
    pub scopes: Vec<String>,
    pub expiration: Option<DateTime<Utc>>,
}

/// Request body for issuing a new API key.
///
/// # JSON Example
///
/// ```json
/// {
///   "owner": "billing-service",
///   "scopes": ["orders:read", "orders:write"],
///   "expiration": "2027-01-01T00:00:00Z"
/// }
/// ```
///
/// # Validation
///
/// - `owner`: required, non-empty
/// - `scopes`: optional, every element must match `resource:action`
/// - `expiration`: optional RFC 3339 timestamp
///
/// Fields are optional at the deserialization level so the handler can
/// answer missing values with a precise 400 instead of a generic body error.
#[derive(Debug, Deserialize)]
pub struct CreateApiKeyRequest {
    pub owner: Option<String>,

    pub scopes: Option<Vec<String>>,

    pub expiration: Option<DateTime<Utc>>,
}

/// Response body when a key has been issued.
///
/// # Security Note
///
/// `key` is the plaintext secret and this is the ONLY time it is ever
/// returned. It is not persisted and cannot be recovered later.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 1,
///   "key": "4f1c...64 hex chars...a9",
///   "owner": "billing-service",
///   "scopes": ["orders:read"],
///   "expiration": null,
///   "status": "active",
///   "created_at": "2026-08-21T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct IssuedKeyResponse {
    pub id: i64,
    pub key: String,
    pub owner: String,
    pub scopes: Vec<String>,
    pub expiration: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// One key in the listing response.
///
/// The verifier and salt never leave the store layer; this projection only
/// carries public fields.
#[derive(Debug, Serialize)]
pub struct ApiKeySummary {
    pub id: i64,
    pub owner: String,
    pub scopes: Vec<String>,
    pub status: String,
    pub expiration: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ApiKeyRecord> for ApiKeySummary {
    fn from(record: ApiKeyRecord) -> Self {
        Self {
            id: record.id,
            owner: record.owner,
            scopes: record.scopes,
            status: record.status,
            expiration: record.expiration,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Request body for the status update (revocation) endpoint.
///
/// # JSON Example
///
/// ```json
/// { "status": "revoked" }
/// ```
///
/// "revoked" is the only status this endpoint accepts; anything else is a
/// 400. Re-activation does not exist.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

/// Response body after a successful revocation.
#[derive(Debug, Serialize)]
pub struct RevokedKeyResponse {
    pub id: i64,
    pub status: String,
    pub updated_at: DateTime<Utc>,
}

impl From<ApiKeyRecord> for RevokedKeyResponse {
    fn from(record: ApiKeyRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
            updated_at: record.updated_at,
        }
    }
}

/// Response body after a successful soft delete.
#[derive(Debug, Serialize)]
pub struct DeletedKeyResponse {
    pub id: i64,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<ApiKeyRecord> for DeletedKeyResponse {
    fn from(record: ApiKeyRecord) -> Self {
        Self {
            id: record.id,
            deleted_at: record.deleted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(status: &str, expiration: Option<DateTime<Utc>>) -> ApiKeyRecord {
        let now = Utc::now();
        ApiKeyRecord {
            id: 1,
            secret_verifier: "aa".repeat(64),
            salt: "bb".repeat(16),
            owner: "tester".to_string(),
            scopes: vec!["orders:read".to_string(), "orders:write".to_string()],
            status: status.to_string(),
            expiration,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn active_status_is_recognized() {
        assert!(record("active", None).is_active());
        assert!(!record("revoked", None).is_active());
    }

    #[test]
    fn key_without_expiration_never_expires() {
        assert!(!record("active", None).is_expired(Utc::now()));
    }

    #[test]
    fn expiration_is_strictly_before_now() {
        let now = Utc::now();
        let past = record("active", Some(now - Duration::seconds(1)));
        let exact = record("active", Some(now));
        let future = record("active", Some(now + Duration::seconds(1)));

        assert!(past.is_expired(now));
        assert!(!exact.is_expired(now));
        assert!(!future.is_expired(now));
    }

    #[test]
    fn scope_membership_is_exact_equality() {
        let key = record("active", None);
        assert!(key.has_scope("orders:read"));
        assert!(!key.has_scope("orders:delete"));
        assert!(!key.has_scope("orders"));
        assert!(!key.has_scope("orders:*"));
    }
}
