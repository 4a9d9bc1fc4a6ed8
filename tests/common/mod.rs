//! Shared loopback helpers for integration tests.

use timed_tcp::{connect, listen_on, Listener, SocketHandle};

pub const LOOPBACK: &str = "127.0.0.1";

/// Listener on an ephemeral port.
pub fn ephemeral_listener() -> Listener {
    listen_on(0).expect("listen on ephemeral port")
}

/// Client connected to `listener`, not yet accepted.
pub fn connect_client(listener: &Listener) -> SocketHandle {
    let handle = SocketHandle::create_stream().expect("create client socket");
    connect(handle, LOOPBACK, listener.port()).expect("connect to loopback listener")
}

/// Connected `(client, server)` pair over loopback.
///
/// The listener is returned too so the port stays bound for the test.
#[allow(dead_code)]
pub fn connected_pair() -> (Listener, SocketHandle, SocketHandle) {
    let listener = ephemeral_listener();
    let client = connect_client(&listener);
    let (server, _) = listener.accept().expect("accept loopback client");
    (listener, client, server)
}

/// A port that nothing is listening on.
#[allow(dead_code)]
pub fn unused_port() -> u16 {
    let listener = ephemeral_listener();
    let port = listener.port();
    listener.into_handle().close().expect("close probe listener");
    port
}
