//! Per-connection CONNECT handling.
//!
//! # Responsibilities
//! - Accumulate and parse the CONNECT request
//! - Dial the requested upstream
//! - Synthesize the 400/502/200 responses
//! - Spawn the two relay directions and join them
//!
//! # Design Decisions
//! - Every failure path answers (or deliberately stays silent), closes the
//!   client, and returns; nothing escapes the connection's task
//! - After the 200 response the handler owns no sockets: each relay
//!   direction holds one read half and one write half, and teardown is
//!   theirs

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use crate::config::ProxyConfig;
use crate::lifecycle::Shutdown;
use crate::net::connection::ConnectionId;
use crate::net::socket;
use crate::tunnel::relay::{self, Direction, RelayError, RelayStats};
use crate::tunnel::request::{self, ConnectRequest, RequestError};

const RESPONSE_ESTABLISHED: &[u8] = b"HTTP/1.1 200 Connection established\r\n\r\n";
const RESPONSE_BAD_GATEWAY: &[u8] = b"HTTP/1.1 502 Bad Gateway\r\n\r\n";

/// Drive one accepted connection from CONNECT to tunnel teardown.
pub async fn handle_connection(mut client: TcpStream, config: Arc<ProxyConfig>, id: ConnectionId) {
    let request = match read_request(&mut client, &config).await {
        Ok(request) => request,
        Err(e) => {
            if e.warrants_response() {
                tracing::error!(connection_id = %id, error = %e, "Bad request");
                let response = format!("HTTP/1.1 400 Bad Request ({e})\r\n\r\n");
                respond_and_close(client, response.as_bytes()).await;
            } else {
                tracing::debug!(connection_id = %id, error = %e, "Client gone before CONNECT completed");
                socket::shutdown_quietly(&mut client, "client").await;
            }
            return;
        }
    };

    tracing::info!(
        connection_id = %id,
        host = %request.host,
        port = request.port,
        "CONNECT request"
    );

    let remote = match dial_upstream(&request, &config).await {
        Ok(remote) => remote,
        Err(e) => {
            tracing::error!(connection_id = %id, target = %request, error = %e, "Upstream dial failed");
            respond_and_close(client, RESPONSE_BAD_GATEWAY).await;
            return;
        }
    };

    if let Err(e) = client.write_all(RESPONSE_ESTABLISHED).await {
        tracing::error!(connection_id = %id, error = %e, "Failed to confirm tunnel");
        socket::shutdown_quietly(&mut client, "client").await;
        return;
    }

    tracing::info!(connection_id = %id, target = %request, "Tunnel established");

    let (uplink, downlink) = spawn_relays(client, remote, &config);
    let (uplink, downlink) = tokio::join!(uplink, downlink);
    log_relay_outcome(id, Direction::ClientToRemote, uplink);
    log_relay_outcome(id, Direction::RemoteToClient, downlink);
}

/// Read and parse the CONNECT header, under the handshake deadline if set.
async fn read_request(
    client: &mut TcpStream,
    config: &ProxyConfig,
) -> Result<ConnectRequest, RequestError> {
    let accumulate = request::read_header(client, config.relay.buffer_size);

    let raw = match deadline(config.timeouts.handshake_secs) {
        Some(limit) => tokio::time::timeout(limit, accumulate)
            .await
            .map_err(|_| RequestError::TimedOut)??,
        None => accumulate.await?,
    };

    ConnectRequest::parse(&raw)
}

/// Open the upstream connection, under the connect deadline if set.
async fn dial_upstream(
    request: &ConnectRequest,
    config: &ProxyConfig,
) -> std::io::Result<TcpStream> {
    let connect = TcpStream::connect((request.host.as_str(), request.port));

    match deadline(config.timeouts.connect_secs) {
        Some(limit) => tokio::time::timeout(limit, connect).await.map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::TimedOut, "upstream connect timed out")
        })?,
        None => connect.await,
    }
}

/// Split both streams and start one relay task per direction.
///
/// Splitting applies only to the client→remote direction, and only when
/// enabled in the configuration.
fn spawn_relays(
    client: TcpStream,
    remote: TcpStream,
    config: &ProxyConfig,
) -> (
    JoinHandle<Result<RelayStats, RelayError>>,
    JoinHandle<Result<RelayStats, RelayError>>,
) {
    let (client_read, client_write) = client.into_split();
    let (remote_read, remote_write) = remote.into_split();

    let shutdown = Arc::new(Shutdown::new());
    let idle = deadline(config.timeouts.idle_secs);

    // Both receivers must exist before either task runs, or a direction
    // finishing instantly could trigger the domain before its sibling
    // subscribed.
    let uplink_rx = shutdown.subscribe();
    let downlink_rx = shutdown.subscribe();

    let uplink = tokio::spawn(relay::run(
        client_read,
        remote_write,
        Direction::ClientToRemote,
        config.relay.clone(),
        idle,
        config.relay.resplit,
        Arc::clone(&shutdown),
        uplink_rx,
    ));
    let downlink = tokio::spawn(relay::run(
        remote_read,
        client_write,
        Direction::RemoteToClient,
        config.relay.clone(),
        idle,
        false,
        shutdown,
        downlink_rx,
    ));

    (uplink, downlink)
}

fn deadline(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Send a synthesized response, then shut the client down quietly.
async fn respond_and_close(mut client: TcpStream, response: &[u8]) {
    if let Err(e) = client.write_all(response).await {
        tracing::debug!(error = %e, "Failed to write error response");
    }
    socket::shutdown_quietly(&mut client, "client").await;
}

fn log_relay_outcome(
    id: ConnectionId,
    direction: Direction,
    outcome: Result<Result<RelayStats, RelayError>, tokio::task::JoinError>,
) {
    match outcome {
        Ok(Ok(stats)) => {
            tracing::info!(
                connection_id = %id,
                %direction,
                packets = stats.packets,
                bytes_in = stats.bytes_in,
                bytes_out = stats.bytes_out,
                "Relay finished"
            );
        }
        Ok(Err(e)) => {
            tracing::error!(
                connection_id = %id,
                %direction,
                packets = e.stats.packets,
                bytes_in = e.stats.bytes_in,
                bytes_out = e.stats.bytes_out,
                error = %e.source,
                "Relay failed"
            );
        }
        Err(e) => {
            tracing::error!(connection_id = %id, %direction, error = %e, "Relay task panicked");
        }
    }
}
