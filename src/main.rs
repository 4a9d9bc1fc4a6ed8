//! Timed TCP echo server.
//!
//! Binds the configured port through the listen path, then serves each
//! accepted connection on its own thread, echoing bytes back with timed
//! reads and writes. A failed bind or listen aborts startup.

use std::path::PathBuf;
use std::process;
use std::thread;

use clap::Parser;

use timed_tcp::config::{load_config, ServerConfig, TimeoutConfig};
use timed_tcp::net::{Listener, SocketHandle};
use timed_tcp::observability::{logging, metrics};
use timed_tcp::{recv_timeout, send_timeout, TransferOutcome};

#[derive(Parser)]
#[command(name = "timed-tcp")]
#[command(about = "Echo server built on timeout-bounded socket transfers", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listening port.
    #[arg(short, long)]
    port: Option<u16>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listener.port = port;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("timed-tcp v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        port = config.listener.port,
        backlog = config.listener.backlog,
        read_timeout_secs = config.timeouts.read_secs,
        write_timeout_secs = config.timeouts.write_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = match Listener::bind(&config.listener) {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start listener");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    loop {
        let (handle, peer) = match listener.accept() {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "Accept failed");
                continue;
            }
        };

        let timeouts = config.timeouts.clone();
        thread::spawn(move || {
            tracing::debug!(peer_addr = %peer, "Session started");
            serve(handle, &timeouts);
            tracing::debug!(peer_addr = %peer, "Session finished");
        });
    }
}

/// Echo until the peer closes, goes idle, or a transfer fails.
fn serve(handle: SocketHandle, timeouts: &TimeoutConfig) {
    let mut buf = [0u8; 4096];
    loop {
        let n = match recv_timeout(&handle, &mut buf, timeouts.read()) {
            TransferOutcome::Transferred(0) => break,
            TransferOutcome::Transferred(n) => n,
            TransferOutcome::TimedOut => {
                tracing::debug!("Idle connection timed out");
                break;
            }
            TransferOutcome::Failed(e) => {
                tracing::debug!(error = %e, "Read failed");
                break;
            }
        };

        if !write_all(&handle, &buf[..n], timeouts) {
            break;
        }
    }

    if let Err(e) = handle.close() {
        tracing::debug!(error = %e, "Close failed");
    }
}

/// Each partial write gets a fresh budget.
fn write_all(handle: &SocketHandle, mut data: &[u8], timeouts: &TimeoutConfig) -> bool {
    while !data.is_empty() {
        match send_timeout(handle, data, timeouts.write()) {
            TransferOutcome::Transferred(n) => data = &data[n..],
            TransferOutcome::TimedOut => {
                tracing::debug!(pending = data.len(), "Write timed out");
                return false;
            }
            TransferOutcome::Failed(e) => {
                tracing::debug!(error = %e, "Write failed");
                return false;
            }
        }
    }
    true
}
