//! TLS record layer handling.
//!
//! # Data Flow
//! ```text
//! first client→upstream buffer
//!     → split.rs (parse record header, validate framing)
//!     → fragments (many small records, randomized boundaries)
//!     → relay writes fragments in payload order
//! ```
//!
//! # Design Decisions
//! - Splitting is a pure buffer rewrite; no stream state is kept
//! - Anything that is not a single complete handshake record passes
//!   through untouched, so framing mistakes can never corrupt a tunnel

pub mod split;
