//! Interrupt handling for SIGINT and SIGTERM.
//!
//! A run is never resumed after an interrupt: the in-flight remote call is
//! dropped and the process exits quietly.

use tokio::signal;
use tracing::{debug, warn};

/// Resolve once SIGINT (Ctrl+C) or SIGTERM is received
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => debug!("Received SIGINT"),
        _ = terminate => debug!("Received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_for_signal_pends_without_signal() {
        let waited = tokio::time::timeout(Duration::from_millis(50), wait_for_signal()).await;
        assert!(waited.is_err());
    }
}
