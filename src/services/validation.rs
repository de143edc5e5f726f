//! Validation engine - decides allow/deny for presented credentials.
//!
//! Because verifiers are salted per record, there is no index from a
//! presented secret to its record. Validation therefore scans every
//! non-deleted record, recomputes the scrypt verifier against each record's
//! salt, and compares in constant time. The checks after a match run in a
//! fixed order: status, then expiration, then scope. A revoked or expired
//! key is reported as such without ever reaching the scope check, so a dead
//! key cannot be probed for the scopes it held.
//!
//! Every attempt, allowed or not, leaves exactly one usage record. That
//! write is a side effect of the decision, not a precondition of it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::{
    error::AppError,
    models::{api_key::ApiKeyRecord, usage::NewUsageRecord},
    services::{credentials, scope, usage_recorder::UsageRecorder},
    store::DynStore,
};

/// Caller details carried into the audit trail.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub ip: String,
    pub user_agent: String,
    pub endpoint: String,
}

/// Metadata returned to the caller for an allowed validation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedMetadata {
    pub key_id: i64,
    pub owner: String,
    pub scopes: Vec<String>,
    pub service: String,
    pub validated_at: DateTime<Utc>,
}

/// Why a validation attempt was denied.
///
/// The order of variants mirrors the order of checks: a key failing an
/// earlier check never reports a later reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The presented secret matched no stored record
    InvalidKey,
    /// The matched key is not in the active status
    Revoked,
    /// The matched key's expiration lies in the past
    Expired,
    /// The matched key does not hold the required scope
    InsufficientScope,
}

impl DenyReason {
    /// Machine token recorded in usage metadata.
    pub fn token(self) -> &'static str {
        match self {
            DenyReason::InvalidKey => "invalid_key",
            DenyReason::Revoked => "revoked",
            DenyReason::Expired => "expired",
            DenyReason::InsufficientScope => "insufficient_scope",
        }
    }

    /// Human-readable message returned to callers.
    pub fn message(self) -> &'static str {
        match self {
            DenyReason::InvalidKey => "Invalid API key",
            DenyReason::Revoked => "API key is revoked",
            DenyReason::Expired => "API key has expired",
            DenyReason::InsufficientScope => "Insufficient scope",
        }
    }
}

/// Outcome of one validation attempt.
#[derive(Debug, Clone)]
pub enum Decision {
    Allowed(AllowedMetadata),
    Denied(DenyReason),
}

/// The validation engine, wired to an injected store and recorder.
#[derive(Clone)]
pub struct ValidationEngine {
    store: DynStore,
    recorder: UsageRecorder,
}

impl ValidationEngine {
    pub fn new(store: DynStore, recorder: UsageRecorder) -> Self {
        Self { store, recorder }
    }

    /// Decide whether `presented_secret` may act with `required_scope` on
    /// behalf of `service`.
    ///
    /// # Preconditions
    ///
    /// All three inputs must be non-empty and the scope must have the
    /// `resource:action` shape. Violations are caller errors and are
    /// reported before any store access or audit write happens.
    ///
    /// # Check Order
    ///
    /// 1. Scan non-deleted records, recomputing each salted verifier
    /// 2. No match: `invalid_key` (audit entry has no key id)
    /// 3. Matched but not active: `revoked`
    /// 4. Matched but expiration passed: `expired`
    /// 5. Matched but scope absent: `insufficient_scope`
    /// 6. Otherwise allowed
    ///
    /// # Errors
    ///
    /// A store failure during the scan surfaces as an internal error; no
    /// audit entry is written in that case.
    pub async fn validate(
        &self,
        presented_secret: &str,
        required_scope: &str,
        service: &str,
        caller: &CallerContext,
    ) -> Result<Decision, AppError> {
        if presented_secret.is_empty() {
            return Err(AppError::InvalidRequest("API key is required".to_string()));
        }
        if required_scope.is_empty() {
            return Err(AppError::InvalidRequest("Scope is required".to_string()));
        }
        if service.is_empty() {
            return Err(AppError::InvalidRequest("Service is required".to_string()));
        }
        if !scope::is_well_formed(required_scope) {
            return Err(AppError::InvalidRequest(malformed_scope_message(
                required_scope,
            )));
        }

        let candidates = self.store.list_keys().await?;
        let matched = find_match(presented_secret, &candidates)?;

        let now = Utc::now();
        let decision = match matched {
            None => Decision::Denied(DenyReason::InvalidKey),
            Some(record) if !record.is_active() => Decision::Denied(DenyReason::Revoked),
            Some(record) if record.is_expired(now) => Decision::Denied(DenyReason::Expired),
            Some(record) if !record.has_scope(required_scope) => {
                Decision::Denied(DenyReason::InsufficientScope)
            }
            Some(record) => Decision::Allowed(AllowedMetadata {
                key_id: record.id,
                owner: record.owner.clone(),
                scopes: record.scopes.clone(),
                service: service.to_string(),
                validated_at: now,
            }),
        };

        // Exactly one audit entry per attempt; its fate never changes the
        // decision already computed above
        let result = match &decision {
            Decision::Allowed(_) => "allowed",
            Decision::Denied(reason) => reason.token(),
        };
        self.recorder
            .record(NewUsageRecord {
                api_key_id: matched.map(|record| record.id),
                action: "validate".to_string(),
                endpoint: caller.endpoint.clone(),
                ip: caller.ip.clone(),
                user_agent: caller.user_agent.clone(),
                metadata: json!({
                    "service": service,
                    "scope": required_scope,
                    "result": result,
                }),
            })
            .await;

        Ok(decision)
    }
}

/// The 400 message for a scope that fails the shape check.
pub fn malformed_scope_message(scope: &str) -> String {
    format!("Invalid scope format: '{scope}' (expected 'resource:action')")
}

/// Scan candidates, recomputing the salted verifier for each one.
///
/// First exact match wins; iteration order is unspecified since verifier
/// collisions across distinct salts are cryptographically negligible. Each
/// comparison is constant-time over the full verifier.
fn find_match<'a>(
    presented_secret: &str,
    candidates: &'a [ApiKeyRecord],
) -> Result<Option<&'a ApiKeyRecord>, AppError> {
    for record in candidates {
        let computed = credentials::derive_verifier(presented_secret, &record.salt)?;
        let matches: bool = computed
            .as_bytes()
            .ct_eq(record.secret_verifier.as_bytes())
            .into();
        if matches {
            return Ok(Some(record));
        }
    }
    Ok(None)
}
