use chrono::Utc;
use reqwest::Client;

use crate::{config::Credentials, error::AuthError, types::Token, utils};

/// Seconds before the recorded expiry at which a token is renewed, so a
/// request never races the actual expiration.
pub const TOKEN_SAFETY_MARGIN_SECS: u64 = 60;

/// Owns the cached access token and its renewal.
///
/// The manager holds the long-lived refresh credential and exchanges it for
/// a short-lived access token lazily: exactly one network call per renewal,
/// zero while the cached token is still inside its safety margin. It keeps
/// the token in memory only; the watcher re-acquires one on startup.
pub struct TokenManager {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    token: Option<Token>,
}

impl TokenManager {
    pub fn new(http: Client, credentials: &Credentials, token_url: String) -> Self {
        TokenManager {
            http,
            token_url,
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            refresh_token: credentials.refresh_token.clone(),
            token: None,
        }
    }

    /// Returns a valid access token, renewing it first when the cached one
    /// is missing or inside the safety margin of its expiry.
    pub async fn get_valid_token(&mut self) -> Result<String, AuthError> {
        if let Some(token) = &self.token {
            let now = Utc::now().timestamp() as u64;
            if !token.is_expired_at(now, TOKEN_SAFETY_MARGIN_SECS) {
                return Ok(token.access_token.clone());
            }
        }

        self.force_refresh().await
    }

    /// Discards the cached token and performs a refresh exchange.
    ///
    /// Used directly by the poll loop when the API rejects a token that the
    /// expiry bookkeeping still considered valid.
    pub async fn force_refresh(&mut self) -> Result<String, AuthError> {
        let token = self.request_token().await?;
        let access_token = token.access_token.clone();
        self.token = Some(token);
        Ok(access_token)
    }

    async fn request_token(&self) -> Result<Token, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = utils::snippet(&response.text().await.unwrap_or_default());
            return Err(AuthError::Endpoint { status, body });
        }

        let json: serde_json::Value = response.json().await?;
        let access_token = json["access_token"]
            .as_str()
            .ok_or_else(|| AuthError::Malformed("access_token missing".to_string()))?
            .to_string();

        Ok(Token {
            access_token,
            // Spotify usually omits the refresh token on a refresh grant;
            // keep using the configured one unless it rotated.
            refresh_token: json["refresh_token"]
                .as_str()
                .unwrap_or(self.refresh_token.as_str())
                .to_string(),
            scope: json["scope"].as_str().unwrap_or_default().to_string(),
            expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
            obtained_at: Utc::now().timestamp() as u64,
        })
    }
}
