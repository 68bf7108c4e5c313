//! Best-effort Last.fm play count lookups.
//!
//! Both lookups follow a "degrade, don't block" policy: any failure is
//! logged at warning level and mapped to `None`, and the notification is
//! sent without the statistic. Nothing in this module can abort a poll
//! cycle.

use log::warn;
use reqwest::Client;

use crate::{
    error::StatsError,
    types::{LastfmTrackResponse, LastfmUserResponse},
};

/// Looks up how often the user has played the given track.
///
/// Returns `None` on any failure, with the reason logged.
pub async fn track_playcount(
    client: &Client,
    api_url: &str,
    api_key: &str,
    username: &str,
    artist: &str,
    track: &str,
) -> Option<u64> {
    match fetch_track_playcount(client, api_url, api_key, username, artist, track).await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("Last.fm track playcount unavailable: {}", e);
            None
        }
    }
}

/// Looks up the user's total scrobble count.
///
/// Returns `None` on any failure, with the reason logged.
pub async fn user_playcount(
    client: &Client,
    api_url: &str,
    api_key: &str,
    username: &str,
) -> Option<u64> {
    match fetch_user_playcount(client, api_url, api_key, username).await {
        Ok(count) => Some(count),
        Err(e) => {
            warn!("Last.fm scrobble count unavailable: {}", e);
            None
        }
    }
}

async fn fetch_track_playcount(
    client: &Client,
    api_url: &str,
    api_key: &str,
    username: &str,
    artist: &str,
    track: &str,
) -> Result<u64, StatsError> {
    let response = client
        .get(api_url)
        .query(&[
            ("method", "track.getInfo"),
            ("api_key", api_key),
            ("artist", artist),
            ("track", track),
            ("username", username),
            ("format", "json"),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(StatsError::Status { status });
    }

    let parsed: LastfmTrackResponse = response.json().await?;
    parse_count(
        parsed.track.and_then(|track| track.userplaycount),
        "track.userplaycount",
    )
}

async fn fetch_user_playcount(
    client: &Client,
    api_url: &str,
    api_key: &str,
    username: &str,
) -> Result<u64, StatsError> {
    let response = client
        .get(api_url)
        .query(&[
            ("method", "user.getInfo"),
            ("user", username),
            ("api_key", api_key),
            ("format", "json"),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(StatsError::Status { status });
    }

    let parsed: LastfmUserResponse = response.json().await?;
    parse_count(parsed.user.and_then(|user| user.playcount), "user.playcount")
}

/// Last.fm serializes counts as strings; parse them defensively.
fn parse_count(raw: Option<String>, field: &str) -> Result<u64, StatsError> {
    let raw = raw.ok_or_else(|| StatsError::Malformed(format!("{} missing", field)))?;
    raw.parse::<u64>()
        .map_err(|_| StatsError::Malformed(format!("{} is not a number: '{}'", field, raw)))
}
