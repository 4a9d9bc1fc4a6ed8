//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default, so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::net::listener::DEFAULT_BACKLOG;
use crate::net::Timeout;

/// Root configuration for the server binary.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listening socket settings.
    pub listener: ListenerConfig,

    /// Per-call transfer budgets.
    pub timeouts: TimeoutConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listening socket configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Port bound on the wildcard address. 0 picks an ephemeral port.
    pub port: u16,

    /// Accept-queue length passed to listen(2).
    pub backlog: i32,

    /// Enable TCP_NODELAY on the listening socket.
    pub nodelay: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: 2001,
            backlog: DEFAULT_BACKLOG,
            nodelay: true,
        }
    }
}

/// Timed transfer budgets, in whole seconds per call.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Budget for each read; an idle connection is dropped when it runs out.
    pub read_secs: u64,

    /// Budget for each write.
    pub write_secs: u64,
}

impl TimeoutConfig {
    pub fn read(&self) -> Timeout {
        Timeout::from_secs(self.read_secs)
    }

    pub fn write(&self) -> Timeout {
        Timeout::from_secs(self.write_secs)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            read_secs: 5,
            write_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
