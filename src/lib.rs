//! Trackcast Library
//!
//! This library provides the building blocks for watching a Spotify account's
//! currently playing track and announcing track changes to a Discord webhook,
//! optionally enriched with Last.fm play counts and a dominant color sampled
//! from the album artwork.
//!
//! # Modules
//!
//! - `api` - HTTP API endpoints for the local authorization callback server
//! - `artwork` - Album artwork download and dominant color extraction
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `discord` - Webhook payload construction and delivery with retries
//! - `error` - Error types shared across the crate
//! - `lastfm` - Best-effort Last.fm play count lookups
//! - `logging` - Dual console/file logger setup for the watcher
//! - `management` - Access token lifecycle management
//! - `poller` - The polling loop and track change detection
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use trackcast::{cli, config};
//!
//! #[tokio::main]
//! async fn main() -> trackcast::Res<()> {
//!     config::load_env().await?;
//!     // Run the watcher...
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod artwork;
pub mod cli;
pub mod config;
pub mod discord;
pub mod error;
pub mod lastfm;
pub mod logging;
pub mod management;
pub mod poller;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern throughout the application
/// using a boxed dynamic error trait object. This allows for flexible
/// error handling while maintaining Send + Sync bounds for async contexts.
///
/// # Type Parameters
///
/// - `T` - The success type returned on successful operations
///
/// # Example
///
/// ```
/// use trackcast::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates in the interactive commands.
///
/// # Example
///
/// ```
/// info!("Starting authorization flow...");
/// info!("Polling every {} seconds", interval);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations.
///
/// # Example
///
/// ```
/// success!("Authorization completed successfully");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination, such as missing configuration
/// at startup.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program
/// termination.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser. Navigate to the URL manually.");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
