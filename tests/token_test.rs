use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};
use trackcast::{
    config::Credentials,
    error::AuthError,
    management::{TOKEN_SAFETY_MARGIN_SECS, TokenManager},
    types::Token,
};

fn test_credentials() -> Credentials {
    Credentials {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        refresh_token: "refresh-token".to_string(),
        webhook_url: "http://127.0.0.1:9/webhook".to_string(),
        lastfm_api_key: None,
        lastfm_username: None,
        poll_interval: Duration::from_secs(15),
    }
}

#[derive(Clone)]
struct TokenStub {
    calls: Arc<AtomicU32>,
    expires_in: u64,
}

async fn token_endpoint(State(stub): State<TokenStub>) -> Json<Value> {
    let n = stub.calls.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({
        "access_token": format!("token-{}", n),
        "token_type": "Bearer",
        "scope": "user-read-currently-playing",
        "expires_in": stub.expires_in,
    }))
}

async fn failing_token_endpoint() -> (StatusCode, String) {
    (
        StatusCode::BAD_REQUEST,
        json!({"error": "invalid_grant"}).to_string(),
    )
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[test]
fn test_expiry_check_respects_safety_margin() {
    let token = Token {
        access_token: "token".to_string(),
        refresh_token: "refresh".to_string(),
        scope: String::new(),
        expires_in: 3600,
        obtained_at: 1000,
    };

    assert_eq!(token.expires_at(), 4600);

    // Fresh token, nowhere near expiry
    assert!(!token.is_expired_at(1000, TOKEN_SAFETY_MARGIN_SECS));

    // One second before the margin is crossed
    assert!(!token.is_expired_at(4539, TOKEN_SAFETY_MARGIN_SECS));

    // Margin crossed, and well past expiry
    assert!(token.is_expired_at(4540, TOKEN_SAFETY_MARGIN_SECS));
    assert!(token.is_expired_at(5000, TOKEN_SAFETY_MARGIN_SECS));
}

#[tokio::test]
async fn test_cached_token_is_reused_while_fresh() {
    let stub = TokenStub {
        calls: Arc::new(AtomicU32::new(0)),
        expires_in: 3600,
    };
    let app = Router::new()
        .route("/token", post(token_endpoint))
        .with_state(stub.clone());
    let addr = spawn(app).await;

    let mut manager = TokenManager::new(
        reqwest::Client::new(),
        &test_credentials(),
        format!("http://{}/token", addr),
    );

    // First call acquires a token, the second reuses it
    assert_eq!(manager.get_valid_token().await.unwrap(), "token-1");
    assert_eq!(manager.get_valid_token().await.unwrap(), "token-1");
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_token_inside_margin_is_renewed() {
    // A 30 second lifetime sits inside the 60 second safety margin, so
    // every access renews
    let stub = TokenStub {
        calls: Arc::new(AtomicU32::new(0)),
        expires_in: 30,
    };
    let app = Router::new()
        .route("/token", post(token_endpoint))
        .with_state(stub.clone());
    let addr = spawn(app).await;

    let mut manager = TokenManager::new(
        reqwest::Client::new(),
        &test_credentials(),
        format!("http://{}/token", addr),
    );

    assert_eq!(manager.get_valid_token().await.unwrap(), "token-1");
    assert_eq!(manager.get_valid_token().await.unwrap(), "token-2");
    assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_force_refresh_discards_cached_token() {
    let stub = TokenStub {
        calls: Arc::new(AtomicU32::new(0)),
        expires_in: 3600,
    };
    let app = Router::new()
        .route("/token", post(token_endpoint))
        .with_state(stub.clone());
    let addr = spawn(app).await;

    let mut manager = TokenManager::new(
        reqwest::Client::new(),
        &test_credentials(),
        format!("http://{}/token", addr),
    );

    assert_eq!(manager.get_valid_token().await.unwrap(), "token-1");
    assert_eq!(manager.force_refresh().await.unwrap(), "token-2");

    // The forced token is now the cached one
    assert_eq!(manager.get_valid_token().await.unwrap(), "token-2");
    assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_refresh_failure_carries_status_and_body() {
    let app = Router::new().route("/token", post(failing_token_endpoint));
    let addr = spawn(app).await;

    let mut manager = TokenManager::new(
        reqwest::Client::new(),
        &test_credentials(),
        format!("http://{}/token", addr),
    );

    match manager.get_valid_token().await {
        Err(AuthError::Endpoint { status, body }) => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("expected AuthError::Endpoint, got {:?}", other),
    }
}
