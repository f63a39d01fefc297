//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger process shutdown
//!
//! Shutdown (shutdown.rs):
//!     Process scope: signal received → accept loop stops
//!     Tunnel scope:  one relay direction ends → sibling direction unblocks
//! ```
//!
//! # Design Decisions
//! - One primitive serves both scopes; a tunnel is just a two-subscriber
//!   shutdown domain
//! - Triggering is idempotent and safe from any task

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
