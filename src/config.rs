//! Configuration management for Trackcast.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. It provides a centralized way to
//! manage application configuration including Spotify API credentials, the
//! Discord webhook, Last.fm settings, and runtime parameters.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use dotenv;

use crate::error::ConfigError;

/// Scope requested during the one-time authorization flow. Reading the
/// player state is all the watcher ever needs.
pub const SPOTIFY_SCOPE: &str = "user-read-currently-playing user-read-playback-state";

/// Default polling interval in seconds when `POLLING_INTERVAL` is unset.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Everything the watcher needs to run, loaded once at startup.
///
/// Immutable after load. The four Spotify/Discord values are required; the
/// Last.fm pair is optional and, when absent, play count enrichment is
/// skipped entirely.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub webhook_url: String,
    pub lastfm_api_key: Option<String>,
    pub lastfm_username: Option<String>,
    pub poll_interval: Duration,
}

impl Credentials {
    /// Loads and validates the watcher configuration from the environment.
    ///
    /// Collects every missing required variable before failing, so the
    /// operator sees the complete list in one diagnostic instead of fixing
    /// variables one at a time.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Missing`] when one or more required variables are
    ///   unset or empty
    /// - [`ConfigError::Invalid`] when `POLLING_INTERVAL` is not a positive
    ///   integer
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut missing: Vec<&str> = Vec::new();
        let mut require = |name: &'static str| match non_empty_var(name) {
            Some(value) => value,
            None => {
                missing.push(name);
                String::new()
            }
        };

        let webhook_url = require("DISCORD_WEBHOOK_URL");
        let client_id = require("SPOTIFY_CLIENT_ID");
        let client_secret = require("SPOTIFY_CLIENT_SECRET");
        let refresh_token = require("SPOTIFY_REFRESH_TOKEN");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing.join(", ")));
        }

        Ok(Credentials {
            client_id,
            client_secret,
            refresh_token,
            webhook_url,
            lastfm_api_key: non_empty_var("LASTFM_API_KEY"),
            lastfm_username: non_empty_var("LASTFM_USERNAME"),
            poll_interval: Duration::from_secs(parse_poll_interval(
                env::var("POLLING_INTERVAL").ok(),
            )?),
        })
    }
}

/// Parses the polling interval, falling back to the default when unset.
///
/// Zero is rejected: a zero-second interval would hammer the player endpoint
/// in a tight loop.
pub fn parse_poll_interval(raw: Option<String>) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(DEFAULT_POLL_INTERVAL_SECS),
        Some(value) => match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(secs),
            _ => Err(ConfigError::Invalid {
                name: "POLLING_INTERVAL",
                value,
            }),
        },
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `trackcast/.env`. This allows users to store
/// configuration securely without hardcoding sensitive values.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/trackcast/.env`
/// - macOS: `~/Library/Application Support/trackcast/.env`
/// - Windows: `%LOCALAPPDATA%/trackcast/.env`
///
/// When no file exists there, a `.env` in the working directory is tried as
/// a fallback, and plain process environment variables always work.
///
/// # Returns
///
/// Returns `Ok(())` if the environment is usable, or an error string if
/// directory creation or file parsing fails.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("trackcast/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    } else {
        // Ad-hoc runs keep their .env next to the binary.
        dotenv::dotenv().ok();
    }
    Ok(())
}

/// Returns the Spotify API client ID for authentication.
///
/// # Panics
///
/// Panics if the `SPOTIFY_CLIENT_ID` environment variable is not set. Only
/// the interactive `auth` command reads configuration this way; the watcher
/// itself goes through [`Credentials::from_env`].
pub fn spotify_client_id() -> String {
    env::var("SPOTIFY_CLIENT_ID").expect("SPOTIFY_CLIENT_ID must be set")
}

/// Returns the Spotify API client secret for authentication.
///
/// # Panics
///
/// Panics if the `SPOTIFY_CLIENT_SECRET` environment variable is not set.
///
/// # Security Note
///
/// The client secret should be kept confidential and never exposed in logs
/// or version control.
pub fn spotify_client_secret() -> String {
    env::var("SPOTIFY_CLIENT_SECRET").expect("SPOTIFY_CLIENT_SECRET must be set")
}

/// Returns the Spotify Web API base URL, overridable via `SPOTIFY_API_URL`.
pub fn spotify_api_url() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| "https://api.spotify.com/v1".to_string())
}

/// Returns the Spotify OAuth token exchange URL, overridable via
/// `SPOTIFY_API_TOKEN_URL`.
pub fn spotify_token_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/api/token".to_string())
}

/// Returns the Spotify OAuth authorization URL, overridable via
/// `SPOTIFY_API_AUTH_URL`.
pub fn spotify_auth_url() -> String {
    env::var("SPOTIFY_API_AUTH_URL")
        .unwrap_or_else(|_| "https://accounts.spotify.com/authorize".to_string())
}

/// Returns the Last.fm API base URL, overridable via `LASTFM_API_URL`.
pub fn lastfm_api_url() -> String {
    env::var("LASTFM_API_URL").unwrap_or_else(|_| "https://ws.audioscrobbler.com/2.0/".to_string())
}

/// Returns the OAuth redirect URI registered with the Spotify application.
///
/// Must match the redirect URI configured in the Spotify developer
/// dashboard. Overridable via `SPOTIFY_API_REDIRECT_URI`.
pub fn redirect_uri() -> String {
    env::var("SPOTIFY_API_REDIRECT_URI")
        .unwrap_or_else(|_| "http://127.0.0.1:8888/callback".to_string())
}

/// Returns the bind address for the local OAuth callback server,
/// overridable via `SERVER_ADDRESS`.
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1:8888".to_string())
}

/// Returns the path of the append-only log file, overridable via
/// `TRACKCAST_LOG_FILE`.
pub fn log_file() -> String {
    env::var("TRACKCAST_LOG_FILE").unwrap_or_else(|_| "trackcast.log".to_string())
}
