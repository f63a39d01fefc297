//! Tunnel subsystem: CONNECT handling and bidirectional relaying.
//!
//! # Data Flow
//! ```text
//! accepted TCP stream
//!     → server.rs (accept loop, per-connection dispatch)
//!     → request.rs (accumulate header, parse CONNECT line)
//!     → handler.rs (validate, dial upstream, synthesize response)
//!     → relay.rs ×2 (one task per direction, joined by the handler)
//!         client→remote direction consults tls::split for early packets
//! ```
//!
//! # Design Decisions
//! - Each tunnel is its own shutdown domain: the first relay direction to
//!   finish triggers it, which unblocks the sibling's pending read
//! - All per-connection errors stay inside the connection's task
//! - The handler never closes sockets itself; relay teardown owns that

pub mod handler;
pub mod relay;
pub mod request;
pub mod server;

pub use relay::{Direction, RelayStats};
pub use request::ConnectRequest;
pub use server::ProxyServer;
