//! Shutdown Signal Handling
//!
//! Signal listening for the binary shell. The poll loop itself has no
//! cancellation; a signal aborts the whole run and the sockets close as
//! their owners drop.

use tokio::signal;
use tracing::info;

use crate::Result;

/// Resolve when a shutdown signal arrives (SIGTERM, SIGINT, Ctrl+C)
pub async fn listen_for_signals() -> Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, aborting run");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, aborting run");
            }
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, aborting run");
            }
        }
    }

    #[cfg(windows)]
    {
        signal::ctrl_c().await?;
        info!("Received Ctrl+C, aborting run");
    }

    Ok(())
}
