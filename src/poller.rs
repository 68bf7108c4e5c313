//! The polling loop and track change detection.
//!
//! [`Poller`] owns the single piece of mutable state in the whole watcher:
//! the identity of the last announced track (inside [`ChangeDetector`]) and
//! the cached access token (inside its [`TokenManager`]). Each cycle fetches
//! the current track, compares it against the stored identity and, only on a
//! change, gathers enrichment and posts to the webhook. Everything runs on
//! one task; cancellation interrupts the idle wait between cycles and the
//! loop finishes its in-flight cycle before exiting.

use std::time::Duration;

use log::{error, info, warn};
use reqwest::Client;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{
    artwork, config,
    config::Credentials,
    discord,
    error::ApiError,
    management::TokenManager,
    spotify,
    types::{Presentation, Profile, Track, TrackKey},
};

/// Timeout applied to every upstream request so a slow service cannot stall
/// the loop across cycles.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest wait between polls after consecutive failures.
const MAX_ERROR_BACKOFF: Duration = Duration::from_secs(60);

/// Remote endpoints the poller talks to. Split out from [`Credentials`] so
/// tests can point a poller at local stand-ins.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub api_url: String,
    pub token_url: String,
    pub lastfm_url: String,
}

impl Endpoints {
    pub fn from_env() -> Self {
        Endpoints {
            api_url: config::spotify_api_url(),
            token_url: config::spotify_token_url(),
            lastfm_url: config::lastfm_api_url(),
        }
    }
}

/// What a completed poll cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing is playing.
    Idle,
    /// The same track as last cycle is still playing.
    Unchanged,
    /// A new track was detected and a notification was attempted.
    Announced,
}

/// Tracks the identity of the last announced track.
///
/// The two-state transition from the poll loop's point of view: a repeated
/// track or repeated silence does nothing, silence after a track clears the
/// stored identity (so the same track is announced again when it resumes
/// later), and a new identity is stored and reported as a change.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last: Option<TrackKey>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        ChangeDetector::default()
    }

    /// Feeds one observation into the detector and returns whether it is a
    /// new track that should be announced.
    ///
    /// The stored identity advances before any notification is attempted,
    /// so a failed delivery is never retried against a track that will be
    /// superseded shortly anyway.
    pub fn observe(&mut self, current: Option<&TrackKey>) -> bool {
        match current {
            None => {
                self.last = None;
                false
            }
            Some(key) => {
                if self.last.as_ref().is_some_and(|last| last.matches(key)) {
                    false
                } else {
                    self.last = Some(key.clone());
                    true
                }
            }
        }
    }

    pub fn current(&self) -> Option<&TrackKey> {
        self.last.as_ref()
    }
}

/// Wait before the next poll after `consecutive_errors` failed cycles: the
/// interval doubled per failure, capped at [`MAX_ERROR_BACKOFF`].
pub fn error_backoff(interval: Duration, consecutive_errors: u32) -> Duration {
    let factor = 2u32.saturating_pow(consecutive_errors.min(6));
    interval.saturating_mul(factor).min(MAX_ERROR_BACKOFF.max(interval))
}

/// The orchestrating loop.
pub struct Poller {
    http: Client,
    tokens: TokenManager,
    detector: ChangeDetector,
    profile: Option<Profile>,
    credentials: Credentials,
    endpoints: Endpoints,
}

impl Poller {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_endpoints(credentials, Endpoints::from_env())
    }

    pub fn with_endpoints(credentials: Credentials, endpoints: Endpoints) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");
        let tokens = TokenManager::new(http.clone(), &credentials, endpoints.token_url.clone());

        Poller {
            http,
            tokens,
            detector: ChangeDetector::new(),
            profile: None,
            credentials,
            endpoints,
        }
    }

    /// Runs the poll loop until `cancel` fires.
    ///
    /// The cancellation signal interrupts the idle wait immediately; an
    /// in-flight cycle is never aborted mid-request, it finishes and then
    /// the loop exits. Runtime errors never terminate the loop: a failed
    /// cycle is logged, the wait grows exponentially while failures repeat
    /// and resets on the next success.
    pub async fn run(&mut self, cancel: CancellationToken) {
        let interval = self.credentials.poll_interval;
        info!("Polling every {} seconds", interval.as_secs());

        let mut consecutive_errors: u32 = 0;

        loop {
            let wait = match self.poll_once().await {
                Ok(outcome) => {
                    consecutive_errors = 0;
                    match outcome {
                        // Nobody is listening; poll at half pace.
                        CycleOutcome::Idle => interval * 2,
                        CycleOutcome::Unchanged | CycleOutcome::Announced => interval,
                    }
                }
                Err(e) => {
                    consecutive_errors += 1;
                    let wait = error_backoff(interval, consecutive_errors);
                    warn!(
                        "Poll cycle failed ({} in a row, next attempt in {}s): {}",
                        consecutive_errors,
                        wait.as_secs(),
                        e
                    );
                    wait
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Shutdown signal received, stopping poller");
                    break;
                }
                _ = sleep(wait) => {}
            }
        }
    }

    /// Executes one poll cycle: fetch, compare, maybe notify.
    pub async fn poll_once(&mut self) -> Result<CycleOutcome, ApiError> {
        let track = self.fetch_current().await?;

        let Some(track) = track else {
            self.detector.observe(None);
            return Ok(CycleOutcome::Idle);
        };

        if !self.detector.observe(Some(&track.key())) {
            return Ok(CycleOutcome::Unchanged);
        }

        let presentation = self.gather_presentation(&track).await;
        let payload = discord::build_payload(
            &track,
            &presentation,
            self.profile.as_ref(),
            self.credentials.lastfm_username.as_deref(),
        );

        match discord::send_update(&self.http, &self.credentials.webhook_url, &payload).await {
            Ok(()) => info!("Now playing: {} - {}", track.artist, track.title),
            // State already advanced; a missed post is not fatal.
            Err(e) => error!(
                "Could not announce '{} - {}': {}",
                track.artist, track.title, e
            ),
        }

        Ok(CycleOutcome::Announced)
    }

    /// Fetches the current track, forcing one token renewal and retrying
    /// once within the same cycle when the API rejects the token.
    async fn fetch_current(&mut self) -> Result<Option<Track>, ApiError> {
        let token = self.tokens.get_valid_token().await?;
        self.ensure_profile(&token).await;

        match spotify::player::currently_playing(&self.http, &self.endpoints.api_url, &token).await
        {
            Err(ApiError::Unauthorized) => {
                warn!("Access token rejected, forcing a refresh");
                let token = self.tokens.force_refresh().await?;
                spotify::player::currently_playing(&self.http, &self.endpoints.api_url, &token)
                    .await
            }
            other => other,
        }
    }

    /// Fetches the account profile on the first successful cycle. Purely
    /// presentational; failures leave the author line generic and are
    /// retried next cycle.
    async fn ensure_profile(&mut self, token: &str) {
        if self.profile.is_some() {
            return;
        }

        match spotify::player::profile(&self.http, &self.endpoints.api_url, token).await {
            Ok(profile) => {
                info!("Connected as: {}", profile.name);
                self.profile = Some(profile);
            }
            Err(e) => warn!("Could not fetch profile: {}", e),
        }
    }

    /// Gathers enrichment for a track change. Every lookup degrades
    /// independently; this never fails the cycle.
    async fn gather_presentation(&self, track: &Track) -> Presentation {
        let color = if track.artwork_url.is_empty() {
            artwork::DEFAULT_EMBED_COLOR
        } else {
            match artwork::dominant_color(&self.http, &track.artwork_url).await {
                Ok(color) => color,
                Err(e) => {
                    warn!("Falling back to default embed color: {}", e);
                    artwork::DEFAULT_EMBED_COLOR
                }
            }
        };

        let (track_plays, total_scrobbles) = match (
            self.credentials.lastfm_api_key.as_deref(),
            self.credentials.lastfm_username.as_deref(),
        ) {
            (Some(api_key), Some(username)) => (
                crate::lastfm::track_playcount(
                    &self.http,
                    &self.endpoints.lastfm_url,
                    api_key,
                    username,
                    &track.artist,
                    &track.title,
                )
                .await,
                crate::lastfm::user_playcount(
                    &self.http,
                    &self.endpoints.lastfm_url,
                    api_key,
                    username,
                )
                .await,
            ),
            _ => (None, None),
        };

        Presentation {
            color,
            track_plays,
            total_scrobbles,
        }
    }
}
