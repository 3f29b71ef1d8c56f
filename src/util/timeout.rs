//! Deadline helpers layered over cancellation tokens.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Cancel `token` once `deadline` elapses, unless it is cancelled first.
///
/// Exchanges impose no timeout of their own; hosts arm one with this.
pub fn cancel_after(token: CancellationToken, deadline: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(deadline) => {
                debug!(deadline_ms = deadline.as_millis() as u64, "deadline reached, cancelling");
                token.cancel();
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn cancels_after_deadline() {
        let token = CancellationToken::new();
        let timer = cancel_after(token.clone(), Duration::from_secs(30));
        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(!token.is_cancelled());
        timer.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn exits_when_cancelled_early() {
        let token = CancellationToken::new();
        let timer = cancel_after(token.clone(), Duration::from_secs(30));
        token.cancel();
        timer.await.unwrap();
        assert!(token.is_cancelled());
    }
}
