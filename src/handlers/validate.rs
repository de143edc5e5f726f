//! Validation HTTP handler.
//!
//! `POST /validate` is the hot path: it hands the presented secret to the
//! validation engine and shapes the decision into the wire format. Denials
//! are 200 responses with `allowed: false` - only malformed requests get a
//! 400, and only store failures get a 500.

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{header, request::Parts},
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    routes::AppState,
    services::validation::{AllowedMetadata, CallerContext, Decision},
};

/// Request body for a validation attempt.
///
/// # JSON Example
///
/// ```json
/// { "apiKey": "4f1c...", "scope": "orders:read", "service": "orders" }
/// ```
///
/// Fields are optional at the deserialization level; the engine reports
/// which one is missing with a precise 400.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    pub api_key: Option<String>,
    pub scope: Option<String>,
    pub service: Option<String>,
}

/// Response body for a validation attempt.
///
/// Exactly one of `metadata` (allowed) or `reason` (denied) is present.
/// `reason` carries the human-readable message; the machine token lives in
/// the usage record's metadata instead.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub allowed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AllowedMetadata>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

/// Extracts the caller details recorded in the audit trail.
///
/// The client IP is the first hop of `X-Forwarded-For` when present, else
/// the peer socket address; both it and the `User-Agent` fall back to
/// "unknown". Extraction never fails - a caller with no identifying headers
/// still gets audited.
pub struct Caller(pub CallerContext);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded_ip = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(|hop| hop.trim().to_string())
            .filter(|hop| !hop.is_empty());

        let ip = forwarded_ip
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| "unknown".to_string());

        Ok(Caller(CallerContext {
            ip,
            user_agent,
            endpoint: parts.uri.path().to_string(),
        }))
    }
}

/// Validate a presented API key against a required scope.
///
/// # Endpoint
///
/// `POST /validate`
///
/// # Response
///
/// - **200 OK, allowed**: `{"allowed": true, "metadata": {keyId, owner,
///   scopes, service, validatedAt}}`
/// - **200 OK, denied**: `{"allowed": false, "reason": "..."}` - the reason
///   is one of "Invalid API key", "API key is revoked", "API key has
///   expired", "Insufficient scope"
/// - **Error (400)**: a field is missing or the scope is malformed; checked
///   before any store access, so no usage record is written
///
/// Every attempt that passes the precondition checks leaves exactly one
/// usage record, whatever the outcome.
pub async fn validate_key(
    State(state): State<AppState>,
    Caller(caller): Caller,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, AppError> {
    let decision = state
        .engine
        .validate(
            request.api_key.as_deref().unwrap_or(""),
            request.scope.as_deref().unwrap_or(""),
            request.service.as_deref().unwrap_or(""),
            &caller,
        )
        .await?;

    let response = match decision {
        Decision::Allowed(metadata) => ValidateResponse {
            allowed: true,
            metadata: Some(metadata),
            reason: None,
        },
        Decision::Denied(reason) => ValidateResponse {
            allowed: false,
            metadata: None,
            reason: Some(reason.message()),
        },
    };

    Ok(Json(response))
}
