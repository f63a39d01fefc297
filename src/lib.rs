//! TLS-record-splitting CONNECT forward proxy.
//!
//! A forward proxy that accepts HTTP CONNECT tunnel requests, dials the
//! requested upstream, and relays opaque traffic in both directions. The
//! first client→upstream packets can be rewritten so that one large TLS
//! handshake record leaves the proxy as many small records with randomized
//! boundaries, defeating middleboxes that key on the first packet.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌─────────────────────────────────────────────────┐
//!                      │                  FORWARD PROXY                  │
//!                      │                                                 │
//!   CONNECT host:port  │  ┌─────────┐        ┌────────────────┐          │
//!   ───────────────────┼─▶│   net   │───────▶│     tunnel     │───dial───┼──▶ upstream
//!                      │  │listener │        │    handler     │          │
//!                      │  └─────────┘        └───────┬────────┘          │
//!                      │                             │ spawns ×2         │
//!                      │            ┌────────────────┴───────────────┐   │
//!                      │            ▼                                ▼   │
//!                      │  relay client→remote            relay remote→client
//!                      │            │ first packets                  │   │
//!                      │            ▼                                │   │
//!                      │       tls::split ──fragments──▶ upstream    │   │
//!                      │                                             │   │
//!                      │  ┌───────────────────────────────────────┐  │   │
//!                      │  │         Cross-Cutting Concerns        │  │   │
//!                      │  │  ┌────────┐ ┌───────────┐ ┌────────┐  │  │   │
//!                      │  │  │ config │ │ observa-  │ │ life-  │  │  │   │
//!                      │  │  │        │ │ bility    │ │ cycle  │  │  │   │
//!                      │  │  └────────┘ └───────────┘ └────────┘  │  │   │
//!                      │  └───────────────────────────────────────┘  │   │
//!                      └─────────────────────────────────────────────┼───┘
//!   relayed bytes                                                    │
//!   ◀────────────────────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod net;
pub mod tls;
pub mod tunnel;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use lifecycle::Shutdown;
pub use tunnel::ProxyServer;
