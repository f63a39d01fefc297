//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags + optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → flag overrides applied by the entry point
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow flag-only invocations
//! - Validation separates syntactic (serde) from semantic checks
//! - Validation reports all violations, not just the first

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProxyConfig;
pub use schema::RelayConfig;
pub use schema::TimeoutConfig;
