use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Owns the simulation's cancellation token.
/// Cancelling it stops the clock; no tick runs afterwards.
#[derive(Debug, Clone, Default)]
pub struct ShutdownGuard {
    token: CancellationToken,
}

impl ShutdownGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cancellation token that all tasks should monitor.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Spawn a background task that cancels the token on SIGTERM or Ctrl+C.
    /// The task exits quietly if the token is cancelled first.
    pub fn spawn_signal_listener(&self) {
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = terminate() => tracing::info!("received SIGTERM, initiating shutdown"),
                _ = signal::ctrl_c() => tracing::info!("received Ctrl+C, initiating shutdown"),
            }
            token.cancel();
        });
    }
}

#[cfg(unix)]
async fn terminate() {
    match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(mut sigterm) => {
            let _ = sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to register SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_token() {
        let guard = ShutdownGuard::new();
        let other = guard.clone();
        let token = guard.token();
        other.token().cancel();
        assert!(guard.token().is_cancelled());
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn listener_exits_after_cancel() {
        let guard = ShutdownGuard::new();
        guard.spawn_signal_listener();
        guard.token().cancel();
        guard.token().cancelled().await;
        assert!(guard.token().is_cancelled());
    }
}
