//! Error types shared across the crate.
//!
//! Each external collaborator gets its own error enum so the poll loop can
//! tell recoverable conditions apart from ones that only warrant a skipped
//! cycle or a degraded notification. Every variant carries enough context
//! (operation, status code, body snippet) to diagnose a failure from the log
//! alone.

use reqwest::StatusCode;
use thiserror::Error;

/// Fatal configuration problems detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {0}")]
    Missing(String),

    #[error("invalid value '{value}' for {name}")]
    Invalid { name: &'static str, value: String },
}

/// Failures of the refresh-token exchange against the Spotify token endpoint.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token endpoint returned {status}: {body}")]
    Endpoint { status: StatusCode, body: String },

    #[error("malformed token response: {0}")]
    Malformed(String),

    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Failures of authenticated Spotify Web API reads.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The access token was rejected. The poll loop reacts by forcing one
    /// token renewal and retrying the read within the same cycle.
    #[error("access token rejected by the API")]
    Unauthorized,

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("request to {endpoint} failed: {source}")]
    Request {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Reasons a Last.fm play count lookup came back empty. Never fatal; the
/// lookup functions log the reason and return `None`.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("stats request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("stats endpoint returned {status}")]
    Status { status: StatusCode },

    #[error("malformed stats response: {0}")]
    Malformed(String),
}

/// Reasons no dominant color could be extracted from album artwork. Never
/// fatal; the caller substitutes the default embed color.
#[derive(Debug, Error)]
pub enum ArtworkError {
    #[error("artwork request failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("artwork endpoint returned {status}")]
    Status { status: StatusCode },

    #[error("artwork larger than {limit} bytes")]
    TooLarge { limit: usize },

    #[error("cannot decode artwork: {0}")]
    Decode(#[from] image::ImageError),

    #[error("artwork has no opaque pixels")]
    Empty,
}

/// Failures delivering a notification to the Discord webhook.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The webhook rejected the payload outright (a non-rate-limit 4xx).
    /// Retrying would not help.
    #[error("webhook rejected the payload with {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    /// All delivery attempts failed with transient errors.
    #[error("delivery failed after {attempts} attempts, last error: {last}")]
    Exhausted { attempts: u32, last: String },
}
