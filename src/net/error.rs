//! Error taxonomy for the socket layer.
//!
//! Timeouts are not errors here: a timed transfer that runs out of budget
//! reports [`TransferOutcome::TimedOut`](crate::net::transfer::TransferOutcome),
//! never one of these types.

use std::fmt;
use std::io;

use thiserror::Error;

use crate::net::addr::Endpoint;
use crate::net::socket::SocketHandle;
use crate::net::transfer::Direction;

/// Socket option names, used to tag option-setting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketOption {
    NonBlocking,
    NoDelay,
    Cork,
    ReuseAddress,
}

impl fmt::Display for SocketOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SocketOption::NonBlocking => "O_NONBLOCK",
            SocketOption::NoDelay => "TCP_NODELAY",
            SocketOption::Cork => "TCP_CORK",
            SocketOption::ReuseAddress => "SO_REUSEADDR",
        };
        f.write_str(name)
    }
}

/// Errors raised while creating, configuring or binding sockets.
#[derive(Debug, Error)]
pub enum SocketError {
    /// Text was not a dotted-decimal IPv4 literal.
    #[error("invalid IPv4 address: {0:?}")]
    InvalidAddress(String),

    /// The OS refused to allocate a stream socket.
    #[error("failed to create stream socket: {0}")]
    Create(#[source] io::Error),

    /// An option-setting call failed.
    #[error("failed to set {option}: {source}")]
    SetOption {
        option: SocketOption,
        #[source]
        source: io::Error,
    },

    /// The handle has no remote endpoint.
    #[error("socket is not connected: {0}")]
    NotConnected(#[source] io::Error),

    #[error("port {port} cannot be used: {source}")]
    Bind {
        port: u16,
        #[source]
        source: io::Error,
    },

    #[error("listen on port {port} with backlog {backlog} failed: {source}")]
    Listen {
        port: u16,
        backlog: i32,
        #[source]
        source: io::Error,
    },

    #[error("failed to accept connection: {0}")]
    Accept(#[source] io::Error),
}

impl SocketError {
    /// Whether this error can only come from a listen path that has to abort.
    ///
    /// Bind and listen failures have no degraded mode, and a listening
    /// socket without address reuse cannot be rebound reliably after a
    /// restart. A [`SocketError::Create`] is shared with the client path and
    /// is not classified here; [`Listener::bind`](crate::net::Listener::bind)
    /// callers treat every error it returns as fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SocketError::Bind { .. }
                | SocketError::Listen { .. }
                | SocketError::SetOption {
                    option: SocketOption::ReuseAddress,
                    ..
                }
        )
    }
}

/// Failure of the client connect path.
///
/// A resolve failure hands the handle back untouched; a connect failure has
/// already closed it.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("cannot resolve remote address {text:?}")]
    Resolve { handle: SocketHandle, text: String },

    #[error("connect to {endpoint} failed: {source}")]
    Connect {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },

    /// Address check or socket allocation failed before any connect was
    /// attempted. Only produced by
    /// [`connect_to`](crate::net::connector::connect_to).
    #[error(transparent)]
    Setup(SocketError),
}

impl ConnectError {
    /// Recover the handle left open by a resolve failure.
    pub fn into_handle(self) -> Option<SocketHandle> {
        match self {
            ConnectError::Resolve { handle, .. } => Some(handle),
            ConnectError::Connect { .. } | ConnectError::Setup(_) => None,
        }
    }
}

/// Failure of a timed transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The readiness wait itself failed; no transfer was attempted.
    #[error("readiness wait failed: {0}")]
    Wait(#[source] io::Error),

    /// The single send/recv call failed.
    #[error("{direction} failed: {source}")]
    Io {
        direction: Direction,
        #[source]
        source: io::Error,
    },
}

impl TransferError {
    /// Underlying OS error.
    pub fn io_error(&self) -> &io::Error {
        match self {
            TransferError::Wait(e) => e,
            TransferError::Io { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        let bind = SocketError::Bind {
            port: 80,
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert!(bind.is_fatal());

        let reuse = SocketError::SetOption {
            option: SocketOption::ReuseAddress,
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(reuse.is_fatal());

        let nodelay = SocketError::SetOption {
            option: SocketOption::NoDelay,
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(!nodelay.is_fatal());
        assert!(!SocketError::InvalidAddress("1.2.3".into()).is_fatal());
        assert!(!SocketError::Create(io::Error::from(io::ErrorKind::Other)).is_fatal());
    }

    #[test]
    fn option_names() {
        assert_eq!(SocketOption::Cork.to_string(), "TCP_CORK");
        assert_eq!(SocketOption::ReuseAddress.to_string(), "SO_REUSEADDR");
    }

    #[test]
    fn bind_message_names_port() {
        let err = SocketError::Bind {
            port: 2001,
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().starts_with("port 2001 cannot be used"));
    }
}
