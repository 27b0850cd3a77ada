//! Graceful shutdown coordination via `CancellationToken`.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Coordinates graceful shutdown between the signal listener and the server.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Get a clone of the cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Initiate shutdown.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether a shutdown has been initiated.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait for Ctrl-C or SIGTERM (or a programmatic [`shutdown`](Self::shutdown)),
    /// then cancel the token.
    pub async fn wait_for_signal(&self) {
        tokio::select! {
            () = ctrl_c() => info!("received Ctrl-C, shutting down"),
            () = terminate() => info!("received SIGTERM, shutting down"),
            () = self.token.cancelled() => {}
        }
        self.shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            let _ = stream.recv().await;
        }
        Err(e) => {
            warn!(error = %e, "failed to listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
