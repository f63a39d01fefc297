//! Shutdown coordination.

use tokio::sync::broadcast;

/// Coordinator for cooperative teardown.
///
/// Provides a broadcast channel that long-running tasks subscribe to. Used
/// process-wide (a signal stops the accept loop) and per-tunnel (whichever
/// relay direction finishes first triggers the domain, unblocking the
/// sibling direction's pending read).
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal. Safe to call more than once.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Get the number of active subscribers (tasks still running).
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_reaches_all_subscribers() {
        let shutdown = Shutdown::new();
        let mut rx1 = shutdown.subscribe();
        let mut rx2 = shutdown.subscribe();

        shutdown.trigger();

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[tokio::test]
    async fn redundant_trigger_is_harmless() {
        let shutdown = Shutdown::new();
        let mut rx = shutdown.subscribe();

        shutdown.trigger();
        shutdown.trigger();

        // Either a value or a lag report; the domain is down regardless.
        let observed = rx.recv().await;
        assert!(
            observed.is_ok()
                || matches!(observed, Err(broadcast::error::RecvError::Lagged(_)))
        );
    }
}
