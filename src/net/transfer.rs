//! Timeout-bounded single-shot transfers.
//!
//! # Algorithm
//! ```text
//! transfer(handle, buf, timeout)
//!     → poll(handle, POLLIN or POLLOUT (by direction), timeout)
//!         0 ready  → TimedOut        (nothing transferred)
//!         -1       → Failed(Wait)    (nothing transferred)
//!         ready    → one recv()/send()
//!                       n >= 0 → Transferred(n)
//!                       error  → Failed(Io)
//! ```
//!
//! # Design Decisions
//! - Exactly one transfer attempt per call. Short reads and writes are
//!   returned as-is; callers that need the whole buffer loop themselves and
//!   budget each call separately.
//! - `Transferred(0)` on a read is an orderly peer close, not an error.
//! - An interrupted wait (`EINTR`) is reported, not retried.

use std::fmt;
use std::io::{self, Read, Write};
use std::os::unix::io::{AsFd, AsRawFd};
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::libc::c_int;
use nix::poll::{poll, PollFd, PollFlags};

use crate::net::error::TransferError;
use crate::net::socket::SocketHandle;
use crate::observability::metrics;

/// Which readiness condition and which call a transfer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Read => "read",
            Direction::Write => "write",
        }
    }

    fn poll_flags(&self) -> PollFlags {
        match self {
            Direction::Read => PollFlags::POLLIN,
            Direction::Write => PollFlags::POLLOUT,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Buffer for one transfer; the variant selects the direction.
#[derive(Debug)]
pub enum TransferBuf<'a> {
    /// Receive into this buffer, up to its length.
    Read(&'a mut [u8]),
    /// Send from this buffer, up to its length.
    Write(&'a [u8]),
}

impl TransferBuf<'_> {
    pub fn direction(&self) -> Direction {
        match self {
            TransferBuf::Read(_) => Direction::Read,
            TransferBuf::Write(_) => Direction::Write,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TransferBuf::Read(buf) => buf.len(),
            TransferBuf::Write(buf) => buf.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wait budget in whole seconds. Zero polls without waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timeout(u64);

impl Timeout {
    pub const ZERO: Timeout = Timeout(0);

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }

    /// Milliseconds for `poll(2)`, clamped to what `c_int` can carry.
    fn as_poll_millis(&self) -> c_int {
        let millis = self.0.saturating_mul(1000);
        c_int::try_from(millis).unwrap_or(c_int::MAX)
    }
}

impl From<u64> for Timeout {
    fn from(secs: u64) -> Self {
        Self(secs)
    }
}

/// Result of a single timed transfer.
#[derive(Debug)]
#[must_use]
pub enum TransferOutcome {
    /// Bytes moved by the one transfer call. Zero on a read means the peer
    /// closed its side.
    Transferred(usize),
    /// The handle did not become ready within the budget.
    TimedOut,
    Failed(TransferError),
}

impl TransferOutcome {
    pub fn is_timed_out(&self) -> bool {
        matches!(self, TransferOutcome::TimedOut)
    }

    pub fn bytes(&self) -> Option<usize> {
        match self {
            TransferOutcome::Transferred(n) => Some(*n),
            _ => None,
        }
    }

    /// `Ok(Some(n))` for a transfer, `Ok(None)` for a timeout.
    pub fn into_result(self) -> Result<Option<usize>, TransferError> {
        match self {
            TransferOutcome::Transferred(n) => Ok(Some(n)),
            TransferOutcome::TimedOut => Ok(None),
            TransferOutcome::Failed(e) => Err(e),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TransferOutcome::Transferred(0) => "peer_closed",
            TransferOutcome::Transferred(_) => "transferred",
            TransferOutcome::TimedOut => "timed_out",
            TransferOutcome::Failed(_) => "failed",
        }
    }
}

/// Wait up to `timeout` for `handle` to become ready, then perform one
/// transfer in the direction selected by `buf`.
pub fn transfer(handle: &SocketHandle, buf: TransferBuf<'_>, timeout: Timeout) -> TransferOutcome {
    let direction = buf.direction();
    // Budgets too large for the clock have no reachable deadline.
    let deadline = Instant::now().checked_add(timeout.as_duration());

    let ready = wait_ready(handle.socket(), direction, timeout);
    let outcome = complete(direction, ready, deadline, || transfer_once(handle, buf));

    tracing::trace!(
        fd = handle.as_raw_fd(),
        %direction,
        outcome = outcome.label(),
        bytes = outcome.bytes(),
        "Timed transfer finished"
    );
    metrics::record_transfer(direction, outcome.label(), outcome.bytes().unwrap_or(0));

    outcome
}

/// Receive into `buf` within `timeout`.
pub fn recv_timeout(handle: &SocketHandle, buf: &mut [u8], timeout: Timeout) -> TransferOutcome {
    transfer(handle, TransferBuf::Read(buf), timeout)
}

/// Send from `buf` within `timeout`.
pub fn send_timeout(handle: &SocketHandle, buf: &[u8], timeout: Timeout) -> TransferOutcome {
    transfer(handle, TransferBuf::Write(buf), timeout)
}

/// Single-shot readiness wait on one descriptor.
///
/// `Ok(true)` when ready, `Ok(false)` when the budget elapsed.
fn wait_ready<F: AsFd>(fd: &F, direction: Direction, timeout: Timeout) -> io::Result<bool> {
    let mut fds = [PollFd::new(fd, direction.poll_flags())];
    let ready = poll(&mut fds, timeout.as_poll_millis())?;
    readiness(ready, fds[0].revents())
}

/// `POLLNVAL` is reported as `EBADF`, like a failed `select(2)`.
fn readiness(ready: c_int, revents: Option<PollFlags>) -> io::Result<bool> {
    if ready == 0 {
        return Ok(false);
    }
    match revents {
        Some(flags) if flags.contains(PollFlags::POLLNVAL) => Err(Errno::EBADF.into()),
        _ => Ok(true),
    }
}

/// Turn the wait result into an outcome, making the single transfer
/// attempt only when the descriptor is ready.
fn complete(
    direction: Direction,
    ready: io::Result<bool>,
    deadline: Option<Instant>,
    attempt: impl FnOnce() -> io::Result<usize>,
) -> TransferOutcome {
    match ready {
        Ok(false) => TransferOutcome::TimedOut,
        Err(e) => TransferOutcome::Failed(TransferError::Wait(e)),
        Ok(true) => match attempt() {
            Ok(n) => TransferOutcome::Transferred(n),
            Err(source) => {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    tracing::debug!(
                        %direction,
                        error = %source,
                        "Transfer failed after its deadline elapsed"
                    );
                }
                TransferOutcome::Failed(TransferError::Io { direction, source })
            }
        },
    }
}

fn transfer_once(handle: &SocketHandle, buf: TransferBuf<'_>) -> io::Result<usize> {
    let mut socket = handle.socket();
    match buf {
        TransferBuf::Read(buf) => socket.read(buf),
        TransferBuf::Write(buf) => socket.write(buf),
    }
}
