//! Stream socket handles and per-connection options.
//!
//! # Responsibilities
//! - Allocate IPv4 stream sockets
//! - Toggle non-blocking mode, `TCP_NODELAY` and `TCP_CORK`
//! - Report the peer endpoint of a connected handle
//!
//! A [`SocketHandle`] owns its descriptor. Dropping it closes the
//! descriptor; [`SocketHandle::close`] does the same but reports the result.

use std::io;
use std::os::unix::io::{AsRawFd, IntoRawFd, RawFd};

use socket2::{Domain, Protocol, Socket, Type};

use crate::net::addr::Endpoint;
use crate::net::error::{SocketError, SocketOption};

/// An open IPv4 stream socket.
#[derive(Debug)]
pub struct SocketHandle {
    inner: Socket,
}

impl SocketHandle {
    /// Allocate a new IPv4 TCP stream socket.
    pub fn create_stream() -> Result<Self, SocketError> {
        let inner = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
            .map_err(SocketError::Create)?;
        tracing::debug!(fd = inner.as_raw_fd(), "Stream socket created");
        Ok(Self { inner })
    }

    pub(crate) fn from_socket(inner: Socket) -> Self {
        Self { inner }
    }

    /// Switch to non-blocking mode. Only `O_NONBLOCK` is touched.
    pub fn set_nonblocking(&self) -> Result<(), SocketError> {
        self.inner
            .set_nonblocking(true)
            .map_err(|source| SocketError::SetOption {
                option: SocketOption::NonBlocking,
                source,
            })
    }

    /// Disable Nagle's algorithm so small writes go out immediately.
    pub fn set_nodelay(&self) -> Result<(), SocketError> {
        self.inner
            .set_nodelay(true)
            .map_err(|source| SocketError::SetOption {
                option: SocketOption::NoDelay,
                source,
            })
    }

    /// Cork or uncork the socket.
    ///
    /// While corked the kernel only sends full segments; uncorking flushes
    /// whatever is pending. Nothing stops a caller from combining this with
    /// [`set_nodelay`](Self::set_nodelay).
    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub fn set_cork(&self, enabled: bool) -> Result<(), SocketError> {
        self.inner
            .set_cork(enabled)
            .map_err(|source| SocketError::SetOption {
                option: SocketOption::Cork,
                source,
            })?;
        tracing::trace!(fd = self.as_raw_fd(), enabled, "TCP_CORK updated");
        Ok(())
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    pub fn set_cork(&self, _enabled: bool) -> Result<(), SocketError> {
        Err(SocketError::SetOption {
            option: SocketOption::Cork,
            source: io::Error::from(io::ErrorKind::Unsupported),
        })
    }

    pub(crate) fn set_reuse_address(&self) -> Result<(), SocketError> {
        self.inner
            .set_reuse_address(true)
            .map_err(|source| SocketError::SetOption {
                option: SocketOption::ReuseAddress,
                source,
            })
    }

    /// Remote endpoint of an established connection.
    pub fn peer_endpoint(&self) -> Result<Endpoint, SocketError> {
        let addr = self.inner.peer_addr().map_err(SocketError::NotConnected)?;
        Endpoint::from_sock_addr(&addr).ok_or_else(|| {
            SocketError::NotConnected(io::Error::new(
                io::ErrorKind::InvalidData,
                "peer address is not IPv4",
            ))
        })
    }

    /// Textual IPv4 address of the peer, for access logs and ACL checks.
    pub fn peer_ip(&self) -> Result<String, SocketError> {
        self.peer_endpoint().map(|ep| ep.ip_string())
    }

    /// Local endpoint this handle is bound to.
    pub fn local_endpoint(&self) -> io::Result<Endpoint> {
        let addr = self.inner.local_addr()?;
        Endpoint::from_sock_addr(&addr)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "local address is not IPv4"))
    }

    /// Close the descriptor and report the OS result.
    pub fn close(self) -> io::Result<()> {
        let fd = self.inner.into_raw_fd();
        nix::unistd::close(fd)?;
        tracing::trace!(fd, "Socket closed");
        Ok(())
    }

    pub(crate) fn socket(&self) -> &Socket {
        &self.inner
    }
}

impl AsRawFd for SocketHandle {
    fn as_raw_fd(&self) -> RawFd {
        self.inner.as_raw_fd()
    }
}
