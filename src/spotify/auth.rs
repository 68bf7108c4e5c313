use std::{sync::Arc, time::Duration};

use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    config, error,
    error::AuthError,
    info,
    server::start_api_server,
    success,
    types::{AuthFlowState, Token},
    utils, warning,
};

/// Runs the one-time interactive authorization flow against Spotify.
///
/// This function orchestrates the whole setup process:
/// 1. Generating a random `state` value to bind the callback to this flow
/// 2. Starting a local callback server
/// 3. Opening the authorization URL in the user's browser
/// 4. Waiting for the OAuth callback to complete the code exchange
/// 5. Printing the refresh token for the operator to place into `.env`
///
/// The watcher itself never runs this flow; it authenticates with the
/// refresh token printed here. Re-running the flow at any time produces a
/// fresh refresh token without invalidating the application credentials.
///
/// # Arguments
///
/// * `shared_state` - Thread-safe shared state carrying the `state` value
///   and the resulting token between this flow and the callback handler
///
/// # Error Handling
///
/// - Browser launch failures result in a warning with manual URL
///   instructions
/// - Authorization timeouts or a missing refresh token terminate with an
///   error message
pub async fn authorize(shared_state: Arc<Mutex<Option<AuthFlowState>>>) {
    let client_id = config::spotify_client_id();
    let csrf_state = utils::generate_state_token();

    // start the callback server
    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    // Construct the authorization URL
    let auth_url = format!(
        "{spotify_auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&scope={scope}&state={state}",
        spotify_auth_url = &config::spotify_auth_url(),
        client_id = &client_id,
        redirect_uri = &config::redirect_uri(),
        scope = config::SPOTIFY_SCOPE,
        state = csrf_state,
    );

    // Store the state value before the redirect happens
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(AuthFlowState {
            csrf_state,
            token: None,
        });
    }

    info!("Opening browser for Spotify authorization...");
    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    // wait for the callback to be hit
    let token = wait_for_token(shared_state).await;

    match token {
        Some(t) if !t.refresh_token.is_empty() => {
            success!("Authorization successful!");
            println!();
            println!("SPOTIFY_REFRESH_TOKEN={}", t.refresh_token);
            println!();
            info!("Add this line to your .env file to complete the setup.");
        }
        Some(_) => {
            error!("Spotify did not return a refresh token. Try revoking access and re-running.");
        }
        None => {
            error!("Authorization failed or timed out.");
        }
    }
}

/// Waits for the OAuth callback to complete and return a token.
///
/// Polls the shared state for a completed token with a 120-second timeout,
/// showing a spinner while the user finishes the browser dance. The
/// callback handler populates the token after a successful exchange.
async fn wait_for_token(shared_state: Arc<Mutex<Option<AuthFlowState>>>) -> Option<Token> {
    use std::time::Instant;

    let pb = ProgressBar::new_spinner();
    pb.set_message("Waiting for authorization...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );

    let max_wait = Duration::from_secs(120);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(flow) = lock.as_ref() {
            if let Some(token) = &flow.token {
                pb.finish_and_clear();
                return Some(token.clone());
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    pb.finish_and_clear();
    None
}

/// Exchanges an authorization code for a token pair.
///
/// Completes the authorization-code flow using HTTP basic auth with the
/// application's client id and secret, matching how the watcher later
/// performs refresh exchanges.
///
/// # Errors
///
/// - [`AuthError::Endpoint`] when the token endpoint answers non-2xx
/// - [`AuthError::Malformed`] when the response lacks an access token
/// - [`AuthError::Request`] for network failures
pub async fn exchange_code(code: &str) -> Result<Token, AuthError> {
    let client = Client::new();
    let response = client
        .post(&config::spotify_token_url())
        .basic_auth(
            config::spotify_client_id(),
            Some(config::spotify_client_secret()),
        )
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &config::redirect_uri()),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = utils::snippet(&response.text().await.unwrap_or_default());
        return Err(AuthError::Endpoint { status, body });
    }

    let json: Value = response.json().await?;
    let access_token = json["access_token"]
        .as_str()
        .ok_or_else(|| AuthError::Malformed("access_token missing".to_string()))?
        .to_string();

    Ok(Token {
        access_token,
        refresh_token: json["refresh_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
        obtained_at: Utc::now().timestamp() as u64,
    })
}
