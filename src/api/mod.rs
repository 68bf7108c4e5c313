//! # API Module
//!
//! HTTP endpoints for the local callback server used by the one-time
//! authorization flow.
//!
//! ## Endpoints
//!
//! - [`callback`] - Handles the OAuth callback from Spotify's authorization
//!   server, verifies the `state` value and completes the code exchange.
//! - [`health`] - Health check returning application status and version.
//!
//! The module is built on [Axum](https://docs.rs/axum); each endpoint is an
//! async function plugged into the router in [`crate::server`]. The server
//! only runs during `trackcast auth` and never while the watcher polls.

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
