//! Timed transfer behaviour on real loopback connections.

use std::thread;
use std::time::{Duration, Instant};

use timed_tcp::{
    recv_timeout, send_timeout, transfer, Direction, Timeout, TransferBuf, TransferError,
    TransferOutcome,
};

mod common;

#[test]
fn read_without_data_times_out_after_budget() {
    let (_listener, client, _server) = common::connected_pair();
    let mut buf = [0u8; 32];

    let started = Instant::now();
    let outcome = recv_timeout(&client, &mut buf, Timeout::from_secs(1));
    let elapsed = started.elapsed();

    assert!(outcome.is_timed_out(), "got {outcome:?}");
    assert!(elapsed >= Duration::from_millis(900), "returned after {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "returned after {elapsed:?}");
}

#[test]
fn zero_budget_polls_without_waiting() {
    let (_listener, client, _server) = common::connected_pair();
    let mut buf = [0u8; 32];

    let started = Instant::now();
    let outcome = recv_timeout(&client, &mut buf, Timeout::ZERO);
    assert!(outcome.is_timed_out());
    assert!(started.elapsed() < Duration::from_millis(500));
}

#[test]
fn small_write_is_sent_in_full() {
    let (_listener, client, server) = common::connected_pair();
    let payload = b"0123456789";

    let outcome = transfer(&client, TransferBuf::Write(payload), Timeout::from_secs(5));
    assert_eq!(outcome.bytes(), Some(payload.len()));

    let mut buf = [0u8; 64];
    let n = recv_timeout(&server, &mut buf, Timeout::from_secs(5))
        .into_result()
        .unwrap()
        .unwrap();
    assert_eq!(&buf[..n], payload);
}

#[test]
fn budgets_beyond_the_clock_range_still_transfer() {
    let (_listener, client, server) = common::connected_pair();

    let outcome = send_timeout(&client, b"0123456789", Timeout::from_secs(u64::MAX));
    assert_eq!(outcome.bytes(), Some(10), "got {outcome:?}");

    let mut buf = [0u8; 16];
    let outcome = recv_timeout(&server, &mut buf, Timeout::from_secs(u64::MAX / 2));
    let n = outcome.bytes().expect("pending data is read");
    assert_eq!(&buf[..n], &b"0123456789"[..n]);
    assert!(n > 0);
}

#[test]
fn read_is_a_single_attempt() {
    let (_listener, client, server) = common::connected_pair();
    assert_eq!(
        send_timeout(&server, b"abcdefghij", Timeout::from_secs(5)).bytes(),
        Some(10)
    );
    thread::sleep(Duration::from_millis(50));

    let mut small = [0u8; 4];
    assert_eq!(
        recv_timeout(&client, &mut small, Timeout::from_secs(5)).bytes(),
        Some(4)
    );
    assert_eq!(&small, b"abcd");

    let mut rest = [0u8; 16];
    let n = recv_timeout(&client, &mut rest, Timeout::from_secs(5))
        .bytes()
        .unwrap();
    assert_eq!(&rest[..n], b"efghij");
}

#[test]
fn pending_data_is_read_with_zero_budget() {
    let (_listener, client, server) = common::connected_pair();
    assert_eq!(
        send_timeout(&server, b"ready", Timeout::from_secs(5)).bytes(),
        Some(5)
    );
    thread::sleep(Duration::from_millis(50));

    let mut buf = [0u8; 8];
    assert_eq!(
        recv_timeout(&client, &mut buf, Timeout::ZERO).bytes(),
        Some(5)
    );
}

#[test]
fn peer_close_reads_as_zero_bytes() {
    let (_listener, client, server) = common::connected_pair();
    server.close().unwrap();

    let mut buf = [0u8; 16];
    match recv_timeout(&client, &mut buf, Timeout::from_secs(5)) {
        TransferOutcome::Transferred(0) => {}
        other => panic!("expected orderly close, got {other:?}"),
    }
}

#[test]
fn data_then_close_reads_data_then_zero() {
    let (_listener, client, server) = common::connected_pair();
    assert_eq!(
        send_timeout(&server, b"bye", Timeout::from_secs(5)).bytes(),
        Some(3)
    );
    server.close().unwrap();

    let mut buf = [0u8; 16];
    assert_eq!(
        recv_timeout(&client, &mut buf, Timeout::from_secs(5)).bytes(),
        Some(3)
    );
    assert_eq!(
        recv_timeout(&client, &mut buf, Timeout::from_secs(5)).bytes(),
        Some(0)
    );
}

#[test]
fn writes_time_out_once_peer_stops_reading() {
    let (_listener, client, _server) = common::connected_pair();
    client.set_nonblocking().unwrap();

    let chunk = vec![0x5a_u8; 256 * 1024];
    let mut timed_out = false;
    for _ in 0..10_000 {
        match send_timeout(&client, &chunk, Timeout::from_secs(1)) {
            TransferOutcome::Transferred(n) => {
                assert!(n > 0 && n <= chunk.len());
            }
            TransferOutcome::TimedOut => {
                timed_out = true;
                break;
            }
            TransferOutcome::Failed(e) => panic!("unexpected failure: {e}"),
        }
    }
    assert!(timed_out, "send buffer never filled");
}

#[test]
fn write_after_peer_reset_fails() {
    let (_listener, client, server) = common::connected_pair();
    server.close().unwrap();
    thread::sleep(Duration::from_millis(50));

    // The first write reaches a closed socket and draws a reset; a later
    // one observes it.
    let mut failure = None;
    for _ in 0..20 {
        match send_timeout(&client, b"ping", Timeout::from_secs(1)) {
            TransferOutcome::Failed(e) => {
                failure = Some(e);
                break;
            }
            _ => thread::sleep(Duration::from_millis(50)),
        }
    }

    match failure {
        Some(TransferError::Io { direction, .. }) => assert_eq!(direction, Direction::Write),
        other => panic!("expected write failure, got {other:?}"),
    }
}

#[test]
fn corked_writes_are_delivered_after_uncork() {
    let (_listener, client, server) = common::connected_pair();
    if client.set_cork(true).is_err() {
        return;
    }

    for part in [&b"HTTP/1.0 200 OK\r\n"[..], b"\r\n", b"body"] {
        assert_eq!(
            send_timeout(&client, part, Timeout::from_secs(5)).bytes(),
            Some(part.len())
        );
    }
    client.set_cork(false).unwrap();

    let mut received = Vec::new();
    let mut buf = [0u8; 64];
    while received.len() < 23 {
        match recv_timeout(&server, &mut buf, Timeout::from_secs(5)) {
            TransferOutcome::Transferred(0) => break,
            TransferOutcome::Transferred(n) => received.extend_from_slice(&buf[..n]),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!(received, b"HTTP/1.0 200 OK\r\n\r\nbody");
}
