//! With a data ring buffer of capacity N, N+1 consecutive sends without an
//! intervening `tick()` succeed for the first N and overflow on the last.

mod common;

use std::time::Instant;

use bytes::Bytes;
use common::{FakeDtlsEngine, FakeIceAgent, FakeSctpEndpoint, RecordingHandler};
use rtc_peer::{DataChannelMode, Error, PeerConnection, PeerOptions};

fn remote_answer_sdp() -> String {
    "v=0\r\no=- 1 2 IN IP4 0.0.0.0\r\ns=-\r\nt=0 0\r\na=ice-ufrag:remoteufrag\r\na=ice-pwd:remotepassword\r\na=fingerprint:sha-256 AA:BB:CC\r\na=setup:active\r\n".to_string()
}

#[test]
fn n_plus_one_sends_without_a_tick_overflow_on_the_last() {
    const CAPACITY: usize = 3;
    let options = PeerOptions {
        datachannel: DataChannelMode::Binary,
        ring_capacity: CAPACITY,
        ..PeerOptions::default()
    };
    let handler = RecordingHandler::default();
    let mut pc = PeerConnection::new(
        options,
        Box::new(FakeIceAgent::new(1)),
        Box::new(FakeDtlsEngine::new()),
        Box::new(FakeSctpEndpoint::new()),
        Box::new(handler.clone()),
    )
    .unwrap();

    pc.create_offer().unwrap();
    pc.tick(Instant::now()).unwrap();
    pc.set_remote_description(&remote_answer_sdp()).unwrap();
    pc.tick(Instant::now()).unwrap(); // -> Connected
    pc.tick(Instant::now()).unwrap(); // handshake completes, SCTP opens

    for _ in 0..CAPACITY {
        pc.datachannel_send(Bytes::from_static(b"x")).unwrap();
    }
    let overflowed = pc.datachannel_send(Bytes::from_static(b"x"));
    assert!(matches!(overflowed, Err(Error::Overflow)));
}
