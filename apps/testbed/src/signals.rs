use anyhow::Result;
use tokio::signal;

/// Shutdown signal handlers.
///
/// Handlers are registered by [`ShutdownSignals::install`], so a signal that
/// arrives before [`ShutdownSignals::recv`] is first polled is still observed.
pub struct ShutdownSignals {
    #[cfg(unix)]
    interrupt: signal::unix::Signal,
    #[cfg(unix)]
    terminate: signal::unix::Signal,
}

impl ShutdownSignals {
    /// # Errors
    /// Returns an error if a signal handler cannot be installed.
    #[cfg(unix)]
    pub fn install() -> Result<Self> {
        use anyhow::Context;
        use signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?,
            terminate: signal(SignalKind::terminate())
                .context("failed to install SIGTERM handler")?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> Result<Self> {
        Ok(Self {})
    }

    /// Wait for Ctrl+C or SIGTERM and return the signal name.
    #[cfg(unix)]
    pub async fn recv(mut self) -> &'static str {
        let name = tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        };
        tracing::info!(signal = name, "Shutdown signal received");
        name
    }

    #[cfg(not(unix))]
    pub async fn recv(self) -> &'static str {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler failed, shutting down");
        }
        tracing::info!(signal = "SIGINT", "Shutdown signal received");
        "SIGINT"
    }
}
