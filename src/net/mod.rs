//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! "a.b.c.d", port
//!     → addr.rs (dotted-decimal → Endpoint)
//!     → socket.rs (SocketHandle, per-socket options)
//!     → connector.rs (client: CREATED → CONNECTED)
//!       listener.rs  (server: CREATED → BOUND → LISTENING → accept)
//!     → transfer.rs (timed single-shot read/write on any handle)
//! ```
//!
//! # Design Decisions
//! - IPv4 stream sockets only
//! - Every call is synchronous; only transfers carry a time budget
//! - Handles are owned values, so a failed connect consumes its handle
//! - Nothing here retries; callers decide whether to retry, close or abort

pub mod addr;
pub mod connector;
pub mod error;
pub mod listener;
pub mod socket;
pub mod transfer;

pub use addr::{resolve, Endpoint};
pub use connector::{connect, connect_to};
pub use error::{ConnectError, SocketError, SocketOption, TransferError};
pub use listener::{listen_on, Listener, DEFAULT_BACKLOG};
pub use socket::SocketHandle;
pub use transfer::{
    recv_timeout, send_timeout, transfer, Direction, Timeout, TransferBuf, TransferOutcome,
};
