//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forward proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, backpressure).
    pub listener: ListenerConfig,

    /// Relay and TLS record splitting settings.
    pub relay: RelayConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Address to bind (IP or hostname).
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18010,
            max_connections: 10_000,
        }
    }
}

/// Relay and record splitting configuration.
///
/// `min_split`/`max_split` bound the payload length of each synthetic TLS
/// record produced when `resplit` is enabled; `resplit_count` is the number
/// of initial client→upstream packets eligible for splitting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Bytes per read on either side of a tunnel.
    pub buffer_size: usize,

    /// Rewrite early client→upstream packets into fragmented TLS records.
    pub resplit: bool,

    /// Number of initial client→upstream packets eligible for splitting.
    pub resplit_count: u64,

    /// Minimum payload length of a synthetic record.
    pub min_split: usize,

    /// Maximum payload length of a synthetic record.
    pub max_split: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            resplit: false,
            resplit_count: 1,
            min_split: 32,
            max_split: 256,
        }
    }
}

/// Timeout configuration for various operations.
///
/// A value of 0 disables the corresponding deadline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for the client to complete its CONNECT header, in seconds.
    pub handshake_secs: u64,

    /// Idle timeout per relay direction in seconds (0 = unbounded).
    pub idle_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            handshake_secs: 30,
            idle_secs: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Verbose tracing of reads and record headers. Overrides `log_level`.
    pub debug: bool,

    /// Only log warnings and errors. Overrides `log_level` and `debug`.
    pub silent: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug: false,
            silent: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
