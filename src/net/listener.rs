//! Passive TCP listener.
//!
//! # Responsibilities
//! - Create the listening socket and enable `TCP_NODELAY`
//! - Force `SO_REUSEADDR` so a restarted server can rebind at once
//! - Bind the wildcard address and listen with the configured backlog
//! - Accept connections as [`SocketHandle`]s
//!
//! Every failure on the way to `LISTENING` is returned as a fatal
//! [`SocketError`]; the half-built socket is closed before returning.

use crate::config::ListenerConfig;
use crate::net::addr::Endpoint;
use crate::net::error::SocketError;
use crate::net::socket::SocketHandle;
use crate::observability::metrics;

/// Fixed accept-queue length used by [`listen_on`].
pub const DEFAULT_BACKLOG: i32 = 1024;

/// A bound, listening IPv4 stream socket.
#[derive(Debug)]
pub struct Listener {
    handle: SocketHandle,
    local: Endpoint,
    backlog: i32,
}

impl Listener {
    /// Bind `0.0.0.0:<port>` and start listening.
    ///
    /// Any error returned here, socket creation included, leaves the server
    /// without a listening socket.
    pub fn bind(config: &ListenerConfig) -> Result<Self, SocketError> {
        let handle = SocketHandle::create_stream()?;

        if config.nodelay {
            if let Err(e) = handle.set_nodelay() {
                tracing::warn!(error = %e, "Continuing without TCP_NODELAY on listener");
            }
        }

        if let Err(e) = handle.set_reuse_address() {
            tracing::error!(error = %e, port = config.port, "Cannot enable address reuse");
            return Err(e);
        }

        let wildcard = Endpoint::unspecified(config.port);
        if let Err(source) = handle.socket().bind(&wildcard.to_sock_addr()) {
            tracing::error!(error = %source, port = config.port, "Port cannot be used");
            return Err(SocketError::Bind {
                port: config.port,
                source,
            });
        }

        if let Err(source) = handle.socket().listen(config.backlog) {
            tracing::error!(error = %source, port = config.port, "Listen failed");
            return Err(SocketError::Listen {
                port: config.port,
                backlog: config.backlog,
                source,
            });
        }

        // Port 0 binds an ephemeral port; report the one the kernel picked.
        let local = match handle.local_endpoint() {
            Ok(local) => local,
            Err(e) => {
                tracing::warn!(error = %e, port = config.port, "Cannot read bound address");
                wildcard
            }
        };

        tracing::info!(
            address = %local,
            backlog = config.backlog,
            "Listener bound"
        );

        Ok(Self {
            handle,
            local,
            backlog: config.backlog,
        })
    }

    /// Block until a client connects.
    ///
    /// Returns the connected handle and the client's endpoint.
    pub fn accept(&self) -> Result<(SocketHandle, Endpoint), SocketError> {
        let (socket, addr) = self.handle.socket().accept().map_err(SocketError::Accept)?;
        let handle = SocketHandle::from_socket(socket);

        let peer = Endpoint::from_sock_addr(&addr).ok_or_else(|| {
            SocketError::Accept(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "peer address is not IPv4",
            ))
        })?;

        tracing::debug!(peer_addr = %peer, "Connection accepted");
        metrics::record_accept();

        Ok((handle, peer))
    }

    /// Local address, with the actual port when bound to port 0.
    pub fn local_endpoint(&self) -> Endpoint {
        self.local
    }

    pub fn port(&self) -> u16 {
        self.local.port()
    }

    pub fn backlog(&self) -> i32 {
        self.backlog
    }

    pub fn handle(&self) -> &SocketHandle {
        &self.handle
    }

    pub fn into_handle(self) -> SocketHandle {
        self.handle
    }
}

/// Listen on `port` with the fixed policy: no-delay, address reuse,
/// wildcard bind, backlog [`DEFAULT_BACKLOG`].
pub fn listen_on(port: u16) -> Result<Listener, SocketError> {
    Listener::bind(&ListenerConfig {
        port,
        ..ListenerConfig::default()
    })
}
