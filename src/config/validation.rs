//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (port non-zero, buffer non-empty)
//! - Check split bounds (`0 < min_split <= max_split <= 16384`)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs once at startup, after CLI overrides are applied

use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// TLS plaintext records cannot carry more than 2^14 bytes of payload.
pub const MAX_RECORD_PAYLOAD: usize = 16_384;

/// A single semantic violation found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Listen port 0 would bind an ephemeral port, which clients cannot know.
    #[error("listener.port must be non-zero")]
    ZeroPort,

    /// The listen host must be present to bind.
    #[error("listener.host must not be empty")]
    EmptyHost,

    #[error("listener.max_connections must be greater than 0")]
    ZeroMaxConnections,

    #[error("relay.buffer_size must be greater than 0")]
    ZeroBufferSize,

    #[error("relay.min_split must be greater than 0")]
    ZeroMinSplit,

    #[error("relay.min_split ({min}) must not exceed relay.max_split ({max})")]
    SplitBoundsInverted { min: usize, max: usize },

    #[error("relay.max_split ({max}) exceeds the TLS record payload ceiling ({MAX_RECORD_PAYLOAD})")]
    OversizedMaxSplit { max: usize },
}

/// Check semantic invariants of a configuration.
///
/// Collects every violation rather than stopping at the first, so a bad
/// config can be fixed in one pass.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.listener.host.is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroMaxConnections);
    }
    if config.relay.buffer_size == 0 {
        errors.push(ValidationError::ZeroBufferSize);
    }
    if config.relay.min_split == 0 {
        errors.push(ValidationError::ZeroMinSplit);
    }
    if config.relay.min_split > config.relay.max_split {
        errors.push(ValidationError::SplitBoundsInverted {
            min: config.relay.min_split,
            max: config.relay.max_split,
        });
    }
    if config.relay.max_split > MAX_RECORD_PAYLOAD {
        errors.push(ValidationError::OversizedMaxSplit {
            max: config.relay.max_split,
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
