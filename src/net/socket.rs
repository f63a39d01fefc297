//! Scoped stream teardown.

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Shut down the write side of a stream, absorbing the error.
///
/// Tunnel teardown runs from whichever relay direction finishes first, so
/// the peer or the sibling direction may already have closed the socket;
/// a failed shutdown here is routine and only worth a debug line.
pub async fn shutdown_quietly<S>(stream: &mut S, role: &'static str)
where
    S: AsyncWrite + Unpin + ?Sized,
{
    if let Err(e) = stream.shutdown().await {
        tracing::debug!(role, error = %e, "stream shutdown failed");
    }
}
