//! IPv4 endpoint resolution.
//!
//! Only dotted-decimal literals are accepted; there is no name lookup.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddrV4};

use socket2::SockAddr;

use crate::net::error::SocketError;

/// An immutable IPv4 address and port pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint(SocketAddrV4);

impl Endpoint {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self(SocketAddrV4::new(ip, port))
    }

    /// The wildcard address (`0.0.0.0`) on `port`.
    pub fn unspecified(port: u16) -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED, port)
    }

    pub fn ip(&self) -> Ipv4Addr {
        *self.0.ip()
    }

    pub fn port(&self) -> u16 {
        self.0.port()
    }

    pub fn octets(&self) -> [u8; 4] {
        self.0.ip().octets()
    }

    /// Address in network byte order, as stored in `sin_addr`.
    pub fn addr_be(&self) -> u32 {
        u32::from(self.ip()).to_be()
    }

    /// Port in network byte order, as stored in `sin_port`.
    pub fn port_be(&self) -> u16 {
        self.port().to_be()
    }

    /// Textual form of the address only, e.g. `"127.0.0.1"`.
    pub fn ip_string(&self) -> String {
        self.ip().to_string()
    }

    pub fn as_socket_addr(&self) -> SocketAddrV4 {
        self.0
    }

    pub(crate) fn to_sock_addr(self) -> SockAddr {
        SockAddr::from(self.0)
    }

    /// Convert an OS-reported address, rejecting anything but IPv4.
    pub(crate) fn from_sock_addr(addr: &SockAddr) -> Option<Self> {
        addr.as_socket_ipv4().map(Self)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SocketAddrV4> for Endpoint {
    fn from(addr: SocketAddrV4) -> Self {
        Self(addr)
    }
}

/// Parse a dotted-decimal IPv4 literal and pair it with `port`.
pub fn resolve(text: &str, port: u16) -> Result<Endpoint, SocketError> {
    let ip: Ipv4Addr = text
        .parse()
        .map_err(|_| SocketError::InvalidAddress(text.to_string()))?;
    Ok(Endpoint::new(ip, port))
}
