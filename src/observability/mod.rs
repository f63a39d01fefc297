//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event; no preformatted strings
//! - Connection ID flows through all tunnel-scoped events
//! - Metrics are cheap (atomic increments) and off by default

pub mod logging;
pub mod metrics;
