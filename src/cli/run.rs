use tokio_util::sync::CancellationToken;

use crate::{config, config::Credentials, error, info, logging, poller::Poller};

/// Starts the watcher: validate configuration, set up logging, wire the
/// interrupt signal into a cancellation token and run the poll loop until
/// it fires.
pub async fn run() {
    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => error!("Configuration error: {}\nPlease check your .env file.", e),
    };

    if let Err(e) = logging::init(&config::log_file()) {
        error!("Cannot initialize logging: {}", e);
    }

    info!("Starting Spotify → Discord watcher");

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, shutting down gracefully...");
            signal_cancel.cancel();
        }
    });

    let mut poller = Poller::new(credentials);
    poller.run(cancel).await;

    log::info!("Stopped");
}
