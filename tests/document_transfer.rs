//! Document Transfer Tests
//!
//! Claim-token authorization on `/storage/{token}`:
//! - Round trip through the local backend
//! - Wrong audience and undecodable tokens are 400 on both methods
//! - Expired tokens are rejected

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use tempfile::TempDir;
use tower::ServiceExt;

use blobgate::claims::{JwtClaimsProvider, StorageClaim};
use blobgate::file_storage::LocalBackend;
use blobgate::http_server::{AppState, HttpServer, HttpServerConfig};
use blobgate::signing::SecretKey;

// =============================================================================
// Test Utilities
// =============================================================================

fn gateway(dir: &TempDir) -> (Router, JwtClaimsProvider) {
    let key = SecretKey::from("document-transfer-secret");
    let provider = JwtClaimsProvider::new(&key);
    let state = AppState::new(
        Arc::new(LocalBackend::new(dir.path().to_path_buf())),
        Arc::new(provider.clone()),
        key,
    );
    let router = HttpServer::new(HttpServerConfig::default(), state).router();
    (router, provider)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn claim(aud: &str, exp: i64) -> StorageClaim {
    StorageClaim {
        user_id: "u1".to_string(),
        document_id: "d1".to_string(),
        aud: aud.to_string(),
        exp,
        iat: Utc::now().timestamp(),
        iss: None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_document_round_trip_and_overwrite() {
    let dir = TempDir::new().unwrap();
    let (router, provider) = gateway(&dir);
    let token = provider.issue("u1", "d1", Duration::minutes(5)).unwrap();
    let uri = format!("/storage/{}", token);

    for content in ["first version", "second version"] {
        let (status, body) = send(
            &router,
            Request::put(&uri).body(Body::from(content)).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"{}");
    }

    let (status, body) = send(&router, Request::get(&uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"second version");

    // persisted under the claim's user
    assert!(dir.path().join("u1").exists());
}

#[tokio::test]
async fn test_wrong_audience_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let (router, provider) = gateway(&dir);
    let token = provider
        .encode_claims(&claim("billing", Utc::now().timestamp() + 300))
        .unwrap();
    let uri = format!("/storage/{}", token);

    let (status, _) = send(&router, Request::put(&uri).body(Body::from("x")).unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, Request::get(&uri).body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(!dir.path().join("u1").exists());
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let dir = TempDir::new().unwrap();
    let (router, provider) = gateway(&dir);
    let token = provider
        .encode_claims(&claim("storage", Utc::now().timestamp() - 60))
        .unwrap();

    let (status, _) = send(
        &router,
        Request::put(format!("/storage/{}", token))
            .body(Body::from("x"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let dir = TempDir::new().unwrap();
    let (router, _) = gateway(&dir);
    let other = JwtClaimsProvider::new(&SecretKey::from("other-secret"));
    let token = other.issue("u1", "d1", Duration::minutes(5)).unwrap();

    let (status, _) = send(
        &router,
        Request::get(format!("/storage/{}", token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health() {
    let dir = TempDir::new().unwrap();
    let (router, _) = gateway(&dir);

    let (status, body) = send(&router, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
}
