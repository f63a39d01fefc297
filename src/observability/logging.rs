//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Derive the base level from the `silent`/`debug` flags
//!
//! # Design Decisions
//! - `RUST_LOG` wins over config when set
//! - `silent` beats `debug` beats `log_level`

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ObservabilityConfig;

/// Initialize the process-wide tracing subscriber.
pub fn init(config: &ObservabilityConfig) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(base_level(config))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolve the base log level from the config flags.
fn base_level(config: &ObservabilityConfig) -> String {
    if config.silent {
        "warn".to_string()
    } else if config.debug {
        "debug".to_string()
    } else {
        config.log_level.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_beats_debug() {
        let config = ObservabilityConfig {
            silent: true,
            debug: true,
            ..Default::default()
        };
        assert_eq!(base_level(&config), "warn");
    }

    #[test]
    fn debug_beats_log_level() {
        let config = ObservabilityConfig {
            debug: true,
            log_level: "error".to_string(),
            ..Default::default()
        };
        assert_eq!(base_level(&config), "debug");
    }

    #[test]
    fn log_level_is_the_default() {
        let config = ObservabilityConfig::default();
        assert_eq!(base_level(&config), "info");
    }
}
