use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    /// Unix timestamp at which the access token stops being accepted.
    pub fn expires_at(&self) -> u64 {
        self.obtained_at + self.expires_in
    }

    /// Whether the token should be considered expired at `now`, renewing
    /// `margin` seconds early so a token never expires mid-request.
    pub fn is_expired_at(&self, now: u64, margin: u64) -> bool {
        now >= self.expires_at().saturating_sub(margin)
    }
}

/// Shared state of the one-time interactive authorization flow, passed
/// between the CLI command and the callback handler.
#[derive(Debug, Clone)]
pub struct AuthFlowState {
    pub csrf_state: String,
    pub token: Option<Token>,
}

/// The currently playing track, normalized from the player endpoint.
///
/// Produced fresh on every poll. Optional metadata that Spotify omits
/// (album, artwork, link) defaults to an empty string rather than failing
/// the parse.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork_url: String,
    pub track_url: String,
    pub is_playing: bool,
}

impl Track {
    pub fn key(&self) -> TrackKey {
        TrackKey {
            id: self.id.clone(),
            artist: self.artist.clone(),
            title: self.title.clone(),
        }
    }
}

/// The identity fields used for change detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackKey {
    pub id: String,
    pub artist: String,
    pub title: String,
}

impl TrackKey {
    /// Two keys denote the same track when their IDs match, falling back to
    /// the (artist, title) tuple when either side lacks an ID (local files
    /// have none).
    pub fn matches(&self, other: &TrackKey) -> bool {
        if !self.id.is_empty() && !other.id.is_empty() {
            self.id == other.id
        } else {
            self.artist == other.artist && self.title == other.title
        }
    }
}

/// Enrichment data gathered per change event. Never cached across tracks.
#[derive(Debug, Clone, Default)]
pub struct Presentation {
    pub color: u32,
    pub track_plays: Option<u64>,
    pub total_scrobbles: Option<u64>,
}

/// The listening account's public profile, shown in the embed author line.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub url: String,
    pub avatar: String,
}

// --- Spotify wire types ---------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentlyPlayingResponse {
    #[serde(default)]
    pub is_playing: bool,
    pub item: Option<PlayingItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayingItem {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ItemArtist>,
    pub album: Option<ItemAlbum>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemArtist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemAlbum {
    pub name: String,
    #[serde(default)]
    pub images: Vec<ItemImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemImage {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub display_name: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<ItemImage>,
}

// --- Last.fm wire types ---------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct LastfmUserResponse {
    pub user: Option<LastfmUserInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastfmUserInfo {
    pub playcount: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastfmTrackResponse {
    pub track: Option<LastfmTrackInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastfmTrackInfo {
    pub userplaycount: Option<String>,
}

// --- Discord webhook payload ----------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub color: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedThumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}
