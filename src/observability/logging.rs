//! Structured logging.
//!
//! # Responsibilities
//! - Install the global `tracing` subscriber for the binaries
//! - Resolve the log filter from the environment or configuration
//!
//! # Design Decisions
//! - The library only emits events; binaries decide where they go
//! - `RUST_LOG` wins over the configured level

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` if set and valid, else `timed_tcp=<level>`.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("timed_tcp={default_level},tcp_probe={default_level}"))
    })
}

/// Install a formatting subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init_logging(default_level: &str) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(default_level))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
