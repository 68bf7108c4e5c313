use std::{collections::HashMap, net::SocketAddr};

use axum::{
    Json, Router,
    extract::Query,
    http::StatusCode,
    routing::get,
};
use serde_json::{Value, json};
use trackcast::lastfm::{track_playcount, user_playcount};

async fn lastfm_endpoint(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    match params.get("method").map(String::as_str) {
        Some("track.getInfo") => Json(json!({"track": {"userplaycount": "37"}})),
        Some("user.getInfo") => Json(json!({"user": {"playcount": "12345"}})),
        _ => Json(json!({})),
    }
}

async fn malformed_endpoint() -> Json<Value> {
    // Well-formed JSON with none of the expected fields
    Json(json!({"message": "something else entirely"}))
}

async fn failing_endpoint() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_track_playcount_is_parsed() {
    let addr = spawn(Router::new().route("/lastfm", get(lastfm_endpoint))).await;
    let client = reqwest::Client::new();

    let count = track_playcount(
        &client,
        &format!("http://{}/lastfm", addr),
        "api-key",
        "listener_fm",
        "Artist A",
        "Song A",
    )
    .await;
    assert_eq!(count, Some(37));
}

#[tokio::test]
async fn test_user_playcount_is_parsed() {
    let addr = spawn(Router::new().route("/lastfm", get(lastfm_endpoint))).await;
    let client = reqwest::Client::new();

    let count = user_playcount(
        &client,
        &format!("http://{}/lastfm", addr),
        "api-key",
        "listener_fm",
    )
    .await;
    assert_eq!(count, Some(12345));
}

#[tokio::test]
async fn test_malformed_response_degrades_to_none() {
    let addr = spawn(Router::new().route("/lastfm", get(malformed_endpoint))).await;
    let client = reqwest::Client::new();

    let count = track_playcount(
        &client,
        &format!("http://{}/lastfm", addr),
        "api-key",
        "listener_fm",
        "Artist A",
        "Song A",
    )
    .await;
    assert_eq!(count, None);
}

#[tokio::test]
async fn test_server_error_degrades_to_none() {
    let addr = spawn(Router::new().route("/lastfm", get(failing_endpoint))).await;
    let client = reqwest::Client::new();

    let count = user_playcount(
        &client,
        &format!("http://{}/lastfm", addr),
        "api-key",
        "listener_fm",
    )
    .await;
    assert_eq!(count, None);
}
