//! Timeout-bounded IPv4 TCP sockets.
//!
//! Resolve dotted-decimal endpoints, create and tune stream sockets, connect
//! or listen, and move bytes with a single readiness-bounded call:
//!
//! ```no_run
//! use timed_tcp::{connect_to, send_timeout, Timeout, TransferOutcome};
//!
//! let handle = connect_to("127.0.0.1", 2001)?;
//! match send_timeout(&handle, b"ping", Timeout::from_secs(5)) {
//!     TransferOutcome::Transferred(n) => println!("sent {n} bytes"),
//!     TransferOutcome::TimedOut => println!("peer not accepting data"),
//!     TransferOutcome::Failed(e) => eprintln!("send failed: {e}"),
//! }
//! # Ok::<(), timed_tcp::ConnectError>(())
//! ```

pub mod config;
pub mod net;
pub mod observability;

pub use config::ServerConfig;
pub use net::{
    connect, connect_to, listen_on, recv_timeout, resolve, send_timeout, transfer, ConnectError,
    Direction, Endpoint, Listener, SocketError, SocketHandle, Timeout, TransferBuf,
    TransferError, TransferOutcome,
};
