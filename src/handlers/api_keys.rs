//! API key lifecycle HTTP handlers.
//!
//! This module implements the key management endpoints:
//! - POST /api-keys - Issue a new key
//! - GET /api-keys - List non-deleted keys
//! - PATCH /api-keys/{id} - Revoke a key
//! - DELETE /api-keys/{id} - Soft-delete a key
//! - GET /api-keys/{id}/usage - Audit history for a key
//!
//! Handlers own request validation and response shaping; everything durable
//! goes through the injected store, and the plaintext secret is only ever
//! present in the issuance response.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    error::AppError,
    models::{
        api_key::{
            ApiKeySummary, CreateApiKeyRequest, DeletedKeyResponse, IssuedKeyResponse, NewApiKey,
            RevokedKeyResponse, UpdateStatusRequest,
        },
        usage::{UsageHistoryResponse, UsageKeyInfo, UsageRecordResponse},
    },
    routes::AppState,
    services::{credentials, scope, validation},
};

/// Issue a new API key.
///
/// # Endpoint
///
/// `POST /api-keys`
///
/// # Request Body
///
/// ```json
/// {
///   "owner": "billing-service",
///   "scopes": ["orders:read"],      // optional, defaults to []
///   "expiration": "2027-01-01T00:00:00Z"  // optional, null = never expires
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the new key, including the plaintext secret
///   in `key` - the only time it is ever returned
/// - **Error (400)**: missing owner or a scope not shaped `resource:action`
///
/// # Validation
///
/// `owner` must be present and non-empty; every element of `scopes` must
/// pass the shape check before the generator is invoked or anything is
/// persisted.
pub async fn issue_key(
    State(state): State<AppState>,
    Json(request): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<IssuedKeyResponse>), AppError> {
    // The trimmed form is what gets stored, so acceptance and storage agree
    let owner = match request.owner.as_deref().map(str::trim) {
        Some(owner) if !owner.is_empty() => owner.to_string(),
        _ => return Err(AppError::InvalidRequest("Owner is required".to_string())),
    };

    let scopes = request.scopes.unwrap_or_default();
    for entry in &scopes {
        if !scope::is_well_formed(entry) {
            return Err(AppError::InvalidRequest(
                validation::malformed_scope_message(entry),
            ));
        }
    }

    let credential = credentials::generate()?;
    let record = state
        .store
        .insert_key(NewApiKey {
            owner,
            secret_verifier: credential.verifier,
            salt: credential.salt,
            scopes,
            expiration: request.expiration,
        })
        .await?;

    tracing::info!(key_id = record.id, owner = %record.owner, "API key issued");

    Ok((
        StatusCode::CREATED,
        Json(IssuedKeyResponse {
            id: record.id,
            key: credential.plaintext,
            owner: record.owner,
            scopes: record.scopes,
            expiration: record.expiration,
            status: record.status,
            created_at: record.created_at,
        }),
    ))
}

/// List all non-deleted API keys, newest first.
///
/// # Endpoint
///
/// `GET /api-keys`
///
/// # Response
///
/// **200 OK** with an array of key summaries. The verifier and salt never
/// appear; soft-deleted keys are excluded.
pub async fn list_keys(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApiKeySummary>>, AppError> {
    let records = state.store.list_keys().await?;
    let summaries = records.into_iter().map(ApiKeySummary::from).collect();
    Ok(Json(summaries))
}

/// Revoke an API key.
///
/// # Endpoint
///
/// `PATCH /api-keys/{id}`
///
/// # Request Body
///
/// ```json
/// { "status": "revoked" }
/// ```
///
/// # Response
///
/// - **Success (200 OK)**: `{id, status, updated_at}`
/// - **Error (400)**: any status other than "revoked" - there is no
///   re-activation and no other transition
/// - **Error (404)**: the id is absent or the key is soft-deleted
///
/// Revoking an already-revoked (but non-deleted) key repeats the update and
/// answers 200.
pub async fn revoke_key(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<RevokedKeyResponse>, AppError> {
    match request.status.as_deref() {
        Some("revoked") => {}
        Some(other) => {
            return Err(AppError::InvalidRequest(format!(
                "Unsupported status: '{other}' (only \"revoked\" is accepted)"
            )));
        }
        None => return Err(AppError::InvalidRequest("Status is required".to_string())),
    }

    let record = state
        .store
        .revoke_key(id)
        .await?
        .ok_or(AppError::KeyNotFound)?;

    tracing::info!(key_id = record.id, "API key revoked");

    Ok(Json(RevokedKeyResponse::from(record)))
}

/// Soft-delete an API key.
///
/// # Endpoint
///
/// `DELETE /api-keys/{id}`
///
/// # Response
///
/// - **Success (200 OK)**: `{id, deleted_at}`
/// - **Error (404)**: the id is absent or the key was already deleted
///
/// Deletion hides the key from listing and validation but keeps the row so
/// its usage history stays queryable. There is no undelete.
pub async fn delete_key(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeletedKeyResponse>, AppError> {
    let record = state
        .store
        .soft_delete_key(id)
        .await?
        .ok_or(AppError::AlreadyDeleted)?;

    tracing::info!(key_id = record.id, "API key soft-deleted");

    Ok(Json(DeletedKeyResponse::from(record)))
}

/// Audit history for one API key.
///
/// # Endpoint
///
/// `GET /api-keys/{id}/usage`
///
/// # Response
///
/// **200 OK** with the usage envelope:
///
/// ```json
/// {
///   "keyId": 1,
///   "totalRequests": 2,
///   "keyInfo": { "owner": "billing-service", "status": "active", "deletedAt": null },
///   "records": [ ... newest first ... ]
/// }
/// ```
///
/// Soft-deleted keys still answer here - that is the point of soft deletion.
/// An id with no usage yields an empty `records` array, and an id with no
/// key row at all yields `keyInfo: null`; neither is an error.
pub async fn key_usage(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UsageHistoryResponse>, AppError> {
    let key_info = state.store.find_key(id).await?.map(|record| UsageKeyInfo {
        owner: record.owner,
        status: record.status,
        deleted_at: record.deleted_at,
    });

    let records: Vec<UsageRecordResponse> = state
        .store
        .usage_for_key(id)
        .await?
        .into_iter()
        .map(UsageRecordResponse::from)
        .collect();

    Ok(Json(UsageHistoryResponse {
        key_id: id,
        total_requests: records.len(),
        key_info,
        records,
    }))
}
