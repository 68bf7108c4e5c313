//! Webhook payload construction and delivery.
//!
//! Builds the rich embed announcing a track change and posts it to the
//! Discord webhook. Delivery retries transient failures (timeouts, 429,
//! 5xx) with exponential backoff and gives up immediately on anything the
//! webhook rejects outright.

use std::time::Duration;

use log::warn;
use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::{
    error::DeliveryError,
    types::{
        Embed, EmbedAuthor, EmbedFooter, EmbedThumbnail, Presentation, Profile, Track,
        WebhookPayload,
    },
    utils,
};

/// Maximum delivery attempts per notification.
pub const MAX_ATTEMPTS: u32 = 3;

const BASE_DELAY: Duration = Duration::from_secs(1);
const MAX_DELAY: Duration = Duration::from_secs(30);

/// How a failed delivery attempt should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Transient; worth another attempt after backing off.
    Retry,
    /// The webhook rejected the payload; retrying cannot help.
    Fail,
}

/// Classifies a non-success response status. Rate limits and server errors
/// are transient; every other client error is final.
pub fn classify_status(status: StatusCode) -> Disposition {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Disposition::Retry
    } else {
        Disposition::Fail
    }
}

/// Delay before retry number `attempt` (zero-based): the base delay doubled
/// each attempt, capped.
pub fn backoff_delay(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt);
    BASE_DELAY.saturating_mul(factor).min(MAX_DELAY)
}

/// Builds the embed payload for a track change.
///
/// Mirrors what listeners expect from a now-playing bot: an author line
/// with the account's name and avatar, the track title linked to Spotify,
/// an artist/album description, the artwork thumbnail, the sampled color
/// and a footer with play counts when Last.fm is configured.
pub fn build_payload(
    track: &Track,
    presentation: &Presentation,
    profile: Option<&Profile>,
    lastfm_username: Option<&str>,
) -> WebhookPayload {
    let author = match profile {
        Some(profile) => EmbedAuthor {
            name: format!("Now playing - {}", profile.name),
            url: lastfm_username
                .map(|user| format!("https://www.last.fm/user/{}", user))
                .or_else(|| non_empty(&profile.url)),
            icon_url: non_empty(&profile.avatar),
        },
        None => EmbedAuthor {
            name: "Now playing".to_string(),
            url: None,
            icon_url: None,
        },
    };

    let description = if track.album.is_empty() {
        format!("**{}**", track.artist)
    } else {
        format!("**{}** • *{}*", track.artist, track.album)
    };

    WebhookPayload {
        embeds: vec![Embed {
            color: presentation.color,
            author: Some(author),
            title: track.title.clone(),
            url: non_empty(&track.track_url),
            description,
            thumbnail: non_empty(&track.artwork_url).map(|url| EmbedThumbnail { url }),
            footer: footer_text(presentation).map(|text| EmbedFooter { text }),
        }],
    }
}

fn footer_text(presentation: &Presentation) -> Option<String> {
    match (presentation.track_plays, presentation.total_scrobbles) {
        (Some(plays), Some(total)) => Some(format!(
            "{} plays • {} total scrobbles",
            utils::group_digits(plays),
            utils::group_digits(total)
        )),
        (Some(plays), None) => Some(format!("{} plays", utils::group_digits(plays))),
        (None, Some(total)) => Some(format!(
            "{} total scrobbles",
            utils::group_digits(total)
        )),
        (None, None) => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Posts the payload to the webhook, retrying transient failures.
///
/// Up to [`MAX_ATTEMPTS`] attempts are made; each retry waits
/// [`backoff_delay`] longer than the last. A non-rate-limit 4xx fails
/// immediately with [`DeliveryError::Rejected`]. When every attempt fails
/// transiently, [`DeliveryError::Exhausted`] carries the last error.
pub async fn send_update(
    client: &Client,
    webhook_url: &str,
    payload: &WebhookPayload,
) -> Result<(), DeliveryError> {
    let mut last_error = String::new();

    for attempt in 0..MAX_ATTEMPTS {
        if attempt > 0 {
            sleep(backoff_delay(attempt - 1)).await;
        }

        match client.post(webhook_url).json(payload).send().await {
            Ok(response) if response.status().is_success() => return Ok(()),
            Ok(response) => {
                let status = response.status();
                let body = utils::snippet(&response.text().await.unwrap_or_default());
                match classify_status(status) {
                    Disposition::Fail => {
                        return Err(DeliveryError::Rejected { status, body });
                    }
                    Disposition::Retry => {
                        warn!(
                            "Webhook delivery attempt {}/{} failed with {}",
                            attempt + 1,
                            MAX_ATTEMPTS,
                            status
                        );
                        last_error = format!("{}: {}", status, body);
                    }
                }
            }
            Err(e) => {
                warn!(
                    "Webhook delivery attempt {}/{} failed: {}",
                    attempt + 1,
                    MAX_ATTEMPTS,
                    e
                );
                last_error = e.to_string();
            }
        }
    }

    Err(DeliveryError::Exhausted {
        attempts: MAX_ATTEMPTS,
        last: last_error,
    })
}
