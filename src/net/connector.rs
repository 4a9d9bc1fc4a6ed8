//! Client-side connection establishment.
//!
//! ```text
//! CREATED ──resolve ok──▶ CONNECTING ──connect ok──▶ CONNECTED
//!    │                         │
//!    │ resolve fails           │ connect fails
//!    ▼                         ▼
//! handle returned in       handle closed,
//! ConnectError::Resolve    ConnectError::Connect
//! ```
//!
//! `connect` takes the handle by value, so a failed connect cannot leave the
//! caller holding a closed descriptor.

use crate::net::addr::resolve;
use crate::net::error::ConnectError;
use crate::net::socket::SocketHandle;
use crate::observability::metrics;

/// Connect `handle` to `remote:port`.
///
/// The connect call blocks until the kernel finishes the handshake. A handle
/// already switched to non-blocking mode reports `EINPROGRESS` as a failure.
pub fn connect(handle: SocketHandle, remote: &str, port: u16) -> Result<SocketHandle, ConnectError> {
    let endpoint = match resolve(remote, port) {
        Ok(endpoint) => endpoint,
        Err(_) => {
            return Err(ConnectError::Resolve {
                handle,
                text: remote.to_string(),
            })
        }
    };

    match handle.socket().connect(&endpoint.to_sock_addr()) {
        Ok(()) => {
            tracing::debug!(remote = %endpoint, "Connected");
            metrics::record_connect(true);
            Ok(handle)
        }
        Err(source) => {
            tracing::debug!(remote = %endpoint, error = %source, "Connect failed");
            metrics::record_connect(false);
            if let Err(e) = handle.close() {
                tracing::warn!(error = %e, "Close after failed connect reported an error");
            }
            Err(ConnectError::Connect { endpoint, source })
        }
    }
}

/// Create a fresh stream socket and connect it to `remote:port`.
///
/// The address is checked before any socket is allocated.
pub fn connect_to(remote: &str, port: u16) -> Result<SocketHandle, ConnectError> {
    resolve(remote, port).map_err(ConnectError::Setup)?;
    let handle = SocketHandle::create_stream().map_err(ConnectError::Setup)?;
    connect(handle, remote, port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::error::SocketError;
    use std::os::unix::io::AsRawFd;

    #[test]
    fn resolve_failure_returns_handle() {
        let handle = SocketHandle::create_stream().unwrap();
        let fd = handle.as_raw_fd();

        let err = connect(handle, "not-an-ip", 80).unwrap_err();
        assert!(matches!(err, ConnectError::Resolve { ref text, .. } if text == "not-an-ip"));

        let handle = err.into_handle().expect("handle handed back");
        assert_eq!(handle.as_raw_fd(), fd);
        handle.close().unwrap();
    }

    #[test]
    fn connect_to_rejects_bad_address() {
        let err = connect_to("10.0.0", 80).unwrap_err();
        assert!(matches!(
            err,
            ConnectError::Setup(SocketError::InvalidAddress(_))
        ));
        assert!(err.into_handle().is_none());
    }
}
