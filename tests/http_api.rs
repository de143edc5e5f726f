//! Endpoint-level tests driving the production router over the in-memory
//! store, one request at a time via `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use api_key_service::store::memory::MemStore;
use api_key_service::{AppState, create_router};

fn test_app() -> Router {
    let store = Arc::new(MemStore::new());
    create_router(AppState::new(store))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ))
    };
    (status, json)
}

async fn issue_key(app: &Router, owner: &str, scopes: &[&str]) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api-keys",
        Some(json!({ "owner": owner, "scopes": scopes })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn health_answers_plain_ok() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));
}

#[tokio::test]
async fn issuing_without_owner_is_a_400() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api-keys",
        Some(json!({ "scopes": ["orders:read"] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Owner is required");
}

#[tokio::test]
async fn issuing_with_blank_owner_is_a_400() {
    let app = test_app();

    let (status, body) = send(&app, "POST", "/api-keys", Some(json!({ "owner": "  " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Owner is required");
}

#[tokio::test]
async fn owner_padding_is_trimmed_before_storage() {
    let app = test_app();

    let (status, issued) = send(
        &app,
        "POST",
        "/api-keys",
        Some(json!({ "owner": "  billing-service  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(issued["owner"], "billing-service");

    let (_, listed) = send(&app, "GET", "/api-keys", None).await;
    assert_eq!(listed[0]["owner"], "billing-service");
}

#[tokio::test]
async fn issuing_with_malformed_scope_is_a_400() {
    let app = test_app();

    for bad_scope in ["orders", "orders:", ":read", "or ders:read"] {
        let (status, body) = send(
            &app,
            "POST",
            "/api-keys",
            Some(json!({ "owner": "tester", "scopes": ["orders:read", bad_scope] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "scope {bad_scope:?}");
        assert_eq!(body["error"]["code"], "invalid_request");
    }
}

#[tokio::test]
async fn issued_key_returns_the_plaintext_exactly_once() {
    let app = test_app();

    let issued = issue_key(&app, "billing-service", &["orders:read"]).await;

    assert_eq!(issued["owner"], "billing-service");
    assert_eq!(issued["status"], "active");
    assert_eq!(issued["scopes"], json!(["orders:read"]));
    assert!(issued["expiration"].is_null());

    // 32 random bytes, hex-encoded
    let key = issued["key"].as_str().unwrap();
    assert_eq!(key.len(), 64);
    assert!(key.chars().all(|c| c.is_ascii_hexdigit()));

    // The listing never shows the secret, the verifier, or the salt
    let (status, listed) = send(&app, "GET", "/api-keys", None).await;
    assert_eq!(status, StatusCode::OK);
    let entry = &listed.as_array().unwrap()[0];
    assert!(entry.get("key").is_none());
    assert!(entry.get("secret_verifier").is_none());
    assert!(entry.get("salt").is_none());
    assert!(entry.get("updated_at").is_some());
}

#[tokio::test]
async fn listing_is_newest_first() {
    let app = test_app();

    let first = issue_key(&app, "first", &[]).await;
    let second = issue_key(&app, "second", &[]).await;

    let (status, listed) = send(&app, "GET", "/api-keys", None).await;
    assert_eq!(status, StatusCode::OK);

    let ids: Vec<i64> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_i64().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![second["id"].as_i64().unwrap(), first["id"].as_i64().unwrap()]
    );
}

#[tokio::test]
async fn revoke_accepts_only_the_revoked_status() {
    let app = test_app();
    let issued = issue_key(&app, "tester", &[]).await;
    let id = issued["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api-keys/{id}"),
        Some(json!({ "status": "active" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Unsupported status")
    );

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api-keys/{id}"),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api-keys/{id}"),
        Some(json!({ "status": "revoked" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64().unwrap(), id);
    assert_eq!(body["status"], "revoked");
}

#[tokio::test]
async fn revoking_an_unknown_id_is_a_404() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "PATCH",
        "/api-keys/999",
        Some(json!({ "status": "revoked" })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "API key not found");
}

#[tokio::test]
async fn deleting_twice_is_a_404_the_second_time() {
    let app = test_app();
    let issued = issue_key(&app, "tester", &[]).await;
    let id = issued["id"].as_i64().unwrap();

    let (status, body) = send(&app, "DELETE", &format!("/api-keys/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64().unwrap(), id);
    assert!(body["deleted_at"].is_string());

    let (status, body) = send(&app, "DELETE", &format!("/api-keys/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"]["message"],
        "API key not found or already deleted"
    );
}

#[tokio::test]
async fn revoking_a_deleted_key_is_a_404() {
    let app = test_app();
    let issued = issue_key(&app, "tester", &[]).await;
    let id = issued["id"].as_i64().unwrap();

    let (status, _) = send(&app, "DELETE", &format!("/api-keys/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api-keys/{id}"),
        Some(json!({ "status": "revoked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn validate_rejects_missing_fields_before_touching_the_store() {
    let app = test_app();

    for (body, message) in [
        (json!({ "scope": "orders:read", "service": "orders" }), "API key is required"),
        (json!({ "apiKey": "abc", "service": "orders" }), "Scope is required"),
        (json!({ "apiKey": "abc", "scope": "orders:read" }), "Service is required"),
    ] {
        let (status, response) = send(&app, "POST", "/validate", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"]["message"], message);
    }
}

#[tokio::test]
async fn validate_rejects_a_malformed_scope() {
    let app = test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/validate",
        Some(json!({ "apiKey": "abc", "scope": "not-a-scope", "service": "orders" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Invalid scope format")
    );
}

#[tokio::test]
async fn usage_for_an_unknown_key_is_an_empty_envelope() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api-keys/42/usage", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["keyId"].as_i64().unwrap(), 42);
    assert_eq!(body["totalRequests"].as_u64().unwrap(), 0);
    assert!(body["keyInfo"].is_null());
    assert_eq!(body["records"], json!([]));
}
