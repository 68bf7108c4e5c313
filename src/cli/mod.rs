//! # CLI Module
//!
//! This module provides the command-line interface layer for Trackcast. It
//! implements the user-facing commands and coordinates between the
//! underlying API clients, the token manager and the poll loop.
//!
//! ## Commands
//!
//! ### Authorization
//!
//! - [`auth`] - Runs the one-time Spotify authorization flow and prints the
//!   refresh token for the operator's `.env` file. Requires
//!   `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET` to be set.
//!
//! ### Watching
//!
//! - [`run`] - The always-on watcher. Validates the configuration, sets up
//!   the dual console/file logger, wires Ctrl+C into a cancellation token
//!   and hands control to [`crate::poller::Poller`]. This is the default
//!   command when none is given.
//!
//! ## Error Handling Philosophy
//!
//! Startup problems (missing configuration, unusable log file) terminate
//! immediately with a diagnostic. Once the watcher loop runs, no runtime
//! error terminates the process; failures are logged and the loop continues
//! with the next cycle. The only clean exit is the interrupt signal.
//!
//! ## Dependencies
//!
//! This module depends on several core application components:
//! - [`crate::spotify`] - Spotify API integration and authorization
//! - [`crate::poller`] - The polling loop and change detection
//! - [`crate::config`] - Configuration loading and validation
//! - [`crate::logging`] - Logger setup for the watcher

mod auth;
mod run;

pub use auth::auth;
pub use run::run;
