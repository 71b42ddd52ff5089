//! fanout worker entry point.

use fanout_common::Config;
use fanout_server::{App, telemetry};
use tokio::signal;
use tracing::info;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result?;
                info!("Received SIGINT, initiating graceful shutdown...");
            },
            _ = terminate.recv() => {
                info!("Received SIGTERM, initiating graceful shutdown...");
            },
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, initiating graceful shutdown...");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    telemetry::init(config.logging.format);

    info!(url = %config.server.url, "Starting fanout worker...");

    let (app, workers) = App::build(&config).await?;
    workers.run(app, shutdown_signal()).await?;

    info!("Worker shutdown complete");
    Ok(())
}
