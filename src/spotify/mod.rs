//! # Spotify Integration Module
//!
//! This module provides the interface to the Spotify Web API used by the
//! watcher: the one-time authorization flow that produces a refresh token,
//! and the authenticated player reads the poll loop performs every cycle.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (CLI, Poller)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authorization (one-time code exchange)
//!     └── Player Reads (currently playing, profile)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Authorization Strategy
//!
//! The watcher runs unattended, so it authenticates with a long-lived
//! refresh token and the application's client id and secret. The refresh
//! token is produced once by the interactive [`auth`] flow:
//!
//! 1. **State Setup**: Generates a random `state` value to bind the callback
//!    to this flow
//! 2. **Server Start**: Launches a local HTTP server to handle the OAuth
//!    callback
//! 3. **Browser Launch**: Opens the Spotify authorization URL in the default
//!    browser
//! 4. **Callback Handling**: The local server receives the authorization code
//! 5. **Token Exchange**: The code is exchanged for tokens using HTTP basic
//!    auth with the client credentials
//! 6. **Operator Handoff**: The refresh token is printed for the operator to
//!    place into the configuration
//!
//! Renewal of access tokens during normal operation lives in
//! [`crate::management::TokenManager`], not here.
//!
//! ## Error Handling
//!
//! [`player`] distinguishes three outcomes the poll loop cares about:
//! nothing playing (HTTP 204 or an empty item), a rejected token (HTTP 401,
//! which triggers exactly one forced renewal and retry within the cycle),
//! and transient failures (everything else, which skip the cycle).
//! Responses are parsed defensively; optional metadata degrades to empty
//! strings instead of failing a cycle.
//!
//! ## API Coverage
//!
//! - `GET /me/player/currently-playing` - the track being listened to
//! - `GET /me` - profile shown in the notification author line
//! - `POST /api/token` - authorization code exchange (one-time flow)

pub mod auth;
pub mod player;
