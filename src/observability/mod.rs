//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! net::* emit:
//!     → tracing events (socket lifecycle, transfer outcomes)
//!     → metrics.rs counters (transfers, bytes, connects, accepts)
//!
//! Binaries install:
//!     → logging.rs (fmt subscriber + EnvFilter)
//!     → metrics.rs (optional Prometheus scrape endpoint)
//! ```

pub mod logging;
pub mod metrics;
