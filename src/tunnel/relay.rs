//! One direction of tunnel byte copying.
//!
//! # Responsibilities
//! - Copy bytes from `src` to `dst` in `buffer_size` reads
//! - Rewrite early client→upstream packets via the TLS record splitter
//! - Maintain packet/byte counters for the completion summary
//! - Tear down the tunnel's shutdown domain when the direction ends
//!
//! # Design Decisions
//! - Fragment transmission order equals payload order; splitting changes
//!   framing, never byte order
//! - A direction ending for any reason (EOF, error, idle deadline) triggers
//!   the tunnel shutdown, which unblocks the sibling direction's read
//! - Errors carry the counters gathered so far and are swallowed at the
//!   task boundary by the handler

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;

use crate::config::RelayConfig;
use crate::lifecycle::Shutdown;
use crate::net::socket;
use crate::observability::metrics;
use crate::tls::split::split_record;

/// Which half of a tunnel a relay serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ClientToRemote,
    RemoteToClient,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::ClientToRemote => "client->remote",
            Direction::RemoteToClient => "remote->client",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters for one finished relay direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Non-empty reads observed.
    pub packets: u64,
    /// Bytes read from `src`.
    pub bytes_in: u64,
    /// Bytes written to `dst`, after any rewriting.
    pub bytes_out: u64,
}

/// A relay direction that died on a transport error.
///
/// Carries the counters gathered up to the failure; the handler logs this
/// and moves on, it never crosses the connection's task boundary.
#[derive(Debug, Error)]
#[error("{direction} relay failed after {packets} packets: {source}", packets = .stats.packets)]
pub struct RelayError {
    pub direction: Direction,
    pub stats: RelayStats,
    #[source]
    pub source: std::io::Error,
}

/// Copy `src` to `dst` until EOF, error, or tunnel shutdown.
///
/// When `split_enabled` holds, the first `resplit_count` packets are passed
/// through the TLS record splitter and the resulting fragments are written
/// in order instead of the raw buffer.
///
/// On exit the write side of `dst` is shut down quietly and the tunnel's
/// shutdown domain is triggered, whichever way the loop ended.
pub async fn run<R, W>(
    mut src: R,
    mut dst: W,
    direction: Direction,
    config: RelayConfig,
    idle: Option<Duration>,
    split_enabled: bool,
    shutdown: Arc<Shutdown>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<RelayStats, RelayError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; config.buffer_size];
    let mut stats = RelayStats::default();

    let outcome = loop {
        let read = tokio::select! {
            _ = shutdown_rx.recv() => break Ok(()),
            read = read_with_deadline(&mut src, &mut buf, idle) => read,
        };

        let n = match read {
            Ok(0) => break Ok(()),
            Ok(n) => n,
            Err(e) => break Err(e),
        };

        stats.packets += 1;
        stats.bytes_in += n as u64;
        tracing::debug!(%direction, packet = stats.packets, bytes = n, "Relay read");

        let data = &buf[..n];
        let write = if split_enabled && stats.packets <= config.resplit_count {
            let split = split_record(data, config.min_split, config.max_split);
            if split.was_split() {
                tracing::info!(
                    %direction,
                    packet = stats.packets,
                    fragments = split.fragments.len(),
                    bytes = split.total_len,
                    "Rewrote packet into fragmented records"
                );
                metrics::record_resplit(split.fragments.len());
            }
            write_fragments(&mut dst, &split.fragments, &mut stats).await
        } else {
            write_all(&mut dst, data, &mut stats).await
        };

        if let Err(e) = write {
            break Err(e);
        }
    };

    socket::shutdown_quietly(&mut dst, direction.as_str()).await;
    shutdown.trigger();

    metrics::record_relay(direction.as_str(), stats.bytes_out);

    match outcome {
        Ok(()) => Ok(stats),
        Err(source) => Err(RelayError {
            direction,
            stats,
            source,
        }),
    }
}

async fn read_with_deadline<R>(
    src: &mut R,
    buf: &mut [u8],
    idle: Option<Duration>,
) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    match idle {
        Some(limit) => match tokio::time::timeout(limit, src.read(buf)).await {
            Ok(read) => read,
            // Idle expiry ends the direction the same way an EOF would.
            Err(_) => Ok(0),
        },
        None => src.read(buf).await,
    }
}

async fn write_all<W>(dst: &mut W, data: &[u8], stats: &mut RelayStats) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    dst.write_all(data).await?;
    dst.flush().await?;
    stats.bytes_out += data.len() as u64;
    Ok(())
}

async fn write_fragments<W>(
    dst: &mut W,
    fragments: &[Vec<u8>],
    stats: &mut RelayStats,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for fragment in fragments {
        dst.write_all(fragment).await?;
        dst.flush().await?;
        stats.bytes_out += fragment.len() as u64;
    }
    Ok(())
}
