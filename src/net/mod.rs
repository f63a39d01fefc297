//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → connection.rs (id assignment, lifetime tracking)
//!     → Hand off to tunnel layer
//!
//! Teardown
//!     → socket.rs (shutdown-then-drop, errors absorbed)
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - Each connection tracked for accounting and log correlation
//! - Stream teardown never propagates errors; a second shutdown of the
//!   same socket is expected during tunnel teardown

pub mod connection;
pub mod listener;
pub mod socket;
