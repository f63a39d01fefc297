//! Accept loop and per-connection dispatch.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::ProxyConfig;
use crate::net::connection::ConnectionTracker;
use crate::net::listener::{Listener, ListenerError};
use crate::observability::metrics;
use crate::tunnel::handler;

/// The proxy server: accepts connections and hands each to its own task.
pub struct ProxyServer {
    config: Arc<ProxyConfig>,
    tracker: ConnectionTracker,
}

impl ProxyServer {
    /// Create a new server with the given (validated) configuration.
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            config: Arc::new(config),
            tracker: ConnectionTracker::new(),
        }
    }

    /// Accept connections until the shutdown signal fires.
    ///
    /// Accept errors propagate out: the entry point treats them, like bind
    /// errors, as fatal. Per-connection failures never reach this loop.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        loop {
            let (stream, peer, permit) = tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!("No longer accepting connections");
                    return Ok(());
                }
                accepted = listener.accept() => accepted?,
            };

            let guard = self.tracker.track();
            let id = guard.id();
            tracing::info!(
                connection_id = %id,
                peer = %peer,
                active = self.tracker.active_count(),
                "Connection accepted"
            );
            metrics::record_accept();

            let config = Arc::clone(&self.config);
            tokio::spawn(async move {
                let _permit = permit;
                let _guard = guard;
                handler::handle_connection(stream, config, id).await;
                metrics::record_close();
            });
        }
    }

    /// Get current active connection count.
    pub fn active_connections(&self) -> u64 {
        self.tracker.active_count()
    }
}
