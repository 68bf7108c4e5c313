use reqwest::{Client, StatusCode};

use crate::{
    error::ApiError,
    types::{CurrentlyPlayingResponse, Profile, ProfileResponse, Track},
    utils,
};

/// Fetches the currently playing track.
///
/// Issues a single authenticated request to the player endpoint and
/// normalizes the response:
///
/// - HTTP 204, or a 200 with no `item`, means nothing is playing and maps
///   to `Ok(None)`
/// - HTTP 401 maps to [`ApiError::Unauthorized`] so the caller can force a
///   token renewal and retry once
/// - any other non-2xx maps to [`ApiError::Status`]; the caller treats it
///   as transient and skips the poll cycle
///
/// Missing optional metadata (album, artwork, link) defaults to an empty
/// string rather than failing the parse.
pub async fn currently_playing(
    client: &Client,
    api_url: &str,
    token: &str,
) -> Result<Option<Track>, ApiError> {
    let url = format!("{api_url}/me/player/currently-playing");
    let response = client
        .get(&url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|source| ApiError::Request {
            endpoint: "currently-playing",
            source,
        })?;

    match response.status() {
        StatusCode::NO_CONTENT => Ok(None),
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        status if !status.is_success() => {
            let body = utils::snippet(&response.text().await.unwrap_or_default());
            Err(ApiError::Status {
                endpoint: "currently-playing",
                status,
                body,
            })
        }
        _ => {
            let parsed = response
                .json::<CurrentlyPlayingResponse>()
                .await
                .map_err(|source| ApiError::Request {
                    endpoint: "currently-playing",
                    source,
                })?;
            Ok(track_from_response(parsed))
        }
    }
}

/// Normalizes the player response into a [`Track`], or `None` when no item
/// is attached (private sessions and podcasts without metadata).
pub fn track_from_response(response: CurrentlyPlayingResponse) -> Option<Track> {
    let item = response.item?;
    Some(Track {
        id: item.id.unwrap_or_default(),
        title: item.name,
        artist: item
            .artists
            .first()
            .map(|artist| artist.name.clone())
            .unwrap_or_default(),
        album: item
            .album
            .as_ref()
            .map(|album| album.name.clone())
            .unwrap_or_default(),
        artwork_url: item
            .album
            .as_ref()
            .and_then(|album| album.images.first())
            .map(|image| image.url.clone())
            .unwrap_or_default(),
        track_url: item.external_urls.spotify.unwrap_or_default(),
        is_playing: response.is_playing,
    })
}

/// Fetches the listening account's public profile for the embed author line.
pub async fn profile(client: &Client, api_url: &str, token: &str) -> Result<Profile, ApiError> {
    let url = format!("{api_url}/me");
    let response = client
        .get(&url)
        .bearer_auth(token)
        .send()
        .await
        .map_err(|source| ApiError::Request {
            endpoint: "me",
            source,
        })?;

    let status = response.status();
    match status {
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        status if !status.is_success() => {
            let body = utils::snippet(&response.text().await.unwrap_or_default());
            Err(ApiError::Status {
                endpoint: "me",
                status,
                body,
            })
        }
        _ => {
            let parsed =
                response
                    .json::<ProfileResponse>()
                    .await
                    .map_err(|source| ApiError::Request {
                        endpoint: "me",
                        source,
                    })?;
            Ok(Profile {
                name: parsed
                    .display_name
                    .unwrap_or_else(|| "Spotify listener".to_string()),
                url: parsed.external_urls.spotify.unwrap_or_default(),
                avatar: parsed
                    .images
                    .first()
                    .map(|image| image.url.clone())
                    .unwrap_or_default(),
            })
        }
    }
}
