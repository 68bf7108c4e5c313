use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use axum::{Router, extract::State, http::StatusCode, routing::post};
use trackcast::{
    discord::{
        Disposition, MAX_ATTEMPTS, backoff_delay, build_payload, classify_status, send_update,
    },
    error::DeliveryError,
    types::{Presentation, Profile, Track},
};

fn test_track() -> Track {
    Track {
        id: "track-a".to_string(),
        title: "Song A".to_string(),
        artist: "Artist A".to_string(),
        album: "Album A".to_string(),
        artwork_url: "https://img.example/a.jpg".to_string(),
        track_url: "https://open.spotify.com/track/a".to_string(),
        is_playing: true,
    }
}

fn test_presentation() -> Presentation {
    Presentation {
        color: 0x1DB954,
        track_plays: Some(37),
        total_scrobbles: Some(12345),
    }
}

#[derive(Clone)]
struct WebhookStub {
    calls: Arc<AtomicU32>,
    failures_before_success: u32,
    fail_status: u16,
}

async fn webhook_endpoint(State(stub): State<WebhookStub>) -> StatusCode {
    let n = stub.calls.fetch_add(1, Ordering::SeqCst);
    if n < stub.failures_before_success {
        StatusCode::from_u16(stub.fail_status).unwrap()
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn spawn(stub: WebhookStub) -> SocketAddr {
    let app = Router::new()
        .route("/webhook", post(webhook_endpoint))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[test]
fn test_status_classification() {
    // Rate limits and server errors are worth retrying
    assert_eq!(
        classify_status(StatusCode::TOO_MANY_REQUESTS),
        Disposition::Retry
    );
    assert_eq!(
        classify_status(StatusCode::INTERNAL_SERVER_ERROR),
        Disposition::Retry
    );
    assert_eq!(classify_status(StatusCode::BAD_GATEWAY), Disposition::Retry);

    // Other client errors are final
    assert_eq!(classify_status(StatusCode::BAD_REQUEST), Disposition::Fail);
    assert_eq!(classify_status(StatusCode::NOT_FOUND), Disposition::Fail);
    assert_eq!(classify_status(StatusCode::UNAUTHORIZED), Disposition::Fail);
}

#[test]
fn test_backoff_doubles_and_caps() {
    assert_eq!(backoff_delay(0), Duration::from_secs(1));
    assert_eq!(backoff_delay(1), Duration::from_secs(2));
    assert_eq!(backoff_delay(2), Duration::from_secs(4));
    assert_eq!(backoff_delay(4), Duration::from_secs(16));

    // Capped from here on
    assert_eq!(backoff_delay(5), Duration::from_secs(30));
    assert_eq!(backoff_delay(12), Duration::from_secs(30));
}

#[test]
fn test_payload_embeds_track_and_enrichment() {
    let profile = Profile {
        name: "listener".to_string(),
        url: "https://open.spotify.com/user/listener".to_string(),
        avatar: "https://img.example/avatar.jpg".to_string(),
    };
    let payload = build_payload(
        &test_track(),
        &test_presentation(),
        Some(&profile),
        Some("listener_fm"),
    );
    let value = serde_json::to_value(&payload).unwrap();
    let embed = &value["embeds"][0];

    assert_eq!(embed["title"], "Song A");
    assert_eq!(embed["url"], "https://open.spotify.com/track/a");
    assert_eq!(embed["color"], 0x1DB954);
    assert_eq!(embed["description"], "**Artist A** • *Album A*");
    assert_eq!(embed["thumbnail"]["url"], "https://img.example/a.jpg");
    assert_eq!(embed["author"]["name"], "Now playing - listener");
    assert_eq!(embed["author"]["url"], "https://www.last.fm/user/listener_fm");
    assert_eq!(embed["author"]["icon_url"], "https://img.example/avatar.jpg");
    assert_eq!(embed["footer"]["text"], "37 plays • 12,345 total scrobbles");
}

#[test]
fn test_payload_degrades_without_profile_and_stats() {
    let mut track = test_track();
    track.album = String::new();
    track.artwork_url = String::new();
    track.track_url = String::new();

    let presentation = Presentation {
        color: 0x1DB954,
        track_plays: None,
        total_scrobbles: None,
    };
    let payload = build_payload(&track, &presentation, None, None);
    let value = serde_json::to_value(&payload).unwrap();
    let embed = &value["embeds"][0];

    assert_eq!(embed["author"]["name"], "Now playing");
    assert_eq!(embed["description"], "**Artist A**");

    // Empty enrichment is omitted, not serialized as null
    assert!(embed.get("footer").is_none());
    assert!(embed.get("thumbnail").is_none());
    assert!(embed.get("url").is_none());
}

#[test]
fn test_partial_footer_lines() {
    let track = test_track();
    let only_total = Presentation {
        color: 0,
        track_plays: None,
        total_scrobbles: Some(1000),
    };
    let payload = build_payload(&track, &only_total, None, None);
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        value["embeds"][0]["footer"]["text"],
        "1,000 total scrobbles"
    );
}

#[tokio::test]
async fn test_delivery_succeeds_first_try() {
    let stub = WebhookStub {
        calls: Arc::new(AtomicU32::new(0)),
        failures_before_success: 0,
        fail_status: 500,
    };
    let addr = spawn(stub.clone()).await;
    let client = reqwest::Client::new();
    let payload = build_payload(&test_track(), &test_presentation(), None, None);

    send_update(&client, &format!("http://{}/webhook", addr), &payload)
        .await
        .unwrap();
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transient_failures_are_retried_until_success() {
    // Fails twice, then succeeds: N + 1 attempts for N < MAX_ATTEMPTS
    let stub = WebhookStub {
        calls: Arc::new(AtomicU32::new(0)),
        failures_before_success: 2,
        fail_status: 500,
    };
    let addr = spawn(stub.clone()).await;
    let client = reqwest::Client::new();
    let payload = build_payload(&test_track(), &test_presentation(), None, None);

    send_update(&client, &format!("http://{}/webhook", addr), &payload)
        .await
        .unwrap();
    assert_eq!(stub.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let stub = WebhookStub {
        calls: Arc::new(AtomicU32::new(0)),
        failures_before_success: 1,
        fail_status: 429,
    };
    let addr = spawn(stub.clone()).await;
    let client = reqwest::Client::new();
    let payload = build_payload(&test_track(), &test_presentation(), None, None);

    send_update(&client, &format!("http://{}/webhook", addr), &payload)
        .await
        .unwrap();
    assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_permanent_failure_is_not_retried() {
    let stub = WebhookStub {
        calls: Arc::new(AtomicU32::new(0)),
        failures_before_success: u32::MAX,
        fail_status: 400,
    };
    let addr = spawn(stub.clone()).await;
    let client = reqwest::Client::new();
    let payload = build_payload(&test_track(), &test_presentation(), None, None);

    let result = send_update(&client, &format!("http://{}/webhook", addr), &payload).await;
    match result {
        Err(DeliveryError::Rejected { status, .. }) => assert_eq!(status.as_u16(), 400),
        other => panic!("expected DeliveryError::Rejected, got {:?}", other),
    }

    // Exactly one attempt was made
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_exhausted_retries_surface_delivery_error() {
    let stub = WebhookStub {
        calls: Arc::new(AtomicU32::new(0)),
        failures_before_success: u32::MAX,
        fail_status: 503,
    };
    let addr = spawn(stub.clone()).await;
    let client = reqwest::Client::new();
    let payload = build_payload(&test_track(), &test_presentation(), None, None);

    let result = send_update(&client, &format!("http://{}/webhook", addr), &payload).await;
    match result {
        Err(DeliveryError::Exhausted { attempts, last }) => {
            assert_eq!(attempts, MAX_ATTEMPTS);
            assert!(last.contains("503"));
        }
        other => panic!("expected DeliveryError::Exhausted, got {:?}", other),
    }

    // Exactly MAX_ATTEMPTS attempts were made
    assert_eq!(stub.calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
}
