//! Deterministic fake collaborators shared by the integration test
//! scenarios. Each fake implements exactly the trait surface
//! `PeerConnection` calls and exposes a `Rc<RefCell<...>>` handle the test
//! can inspect or prime, instead of driving real cryptography or a real
//! socket.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use bytes::Bytes;
use rtc_peer::collaborators::{
    DtlsEngine, DtlsEvent, DtlsState, DtlsFingerprint, IceAgent, IceCredentials,
    RemoteIceDescription, SctpEndpoint, SctpEvent, SrtpContext,
};
use rtc_peer::Result;

#[derive(Clone)]
pub struct SentPackets(pub Rc<RefCell<Vec<Bytes>>>);

impl SentPackets {
    pub fn new() -> Self {
        SentPackets(Rc::new(RefCell::new(Vec::new())))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

/// A controlled-role ICE agent that nominates a pair after a configurable
/// number of `connectivity_check` calls, and that a test can queue inbound
/// datagrams into directly (simulating the wire).
pub struct FakeIceAgent {
    pub checks_until_nominated: u32,
    pub inbound: Rc<RefCell<VecDeque<Bytes>>>,
    pub sent: SentPackets,
}

impl FakeIceAgent {
    pub fn new(checks_until_nominated: u32) -> Self {
        FakeIceAgent {
            checks_until_nominated,
            inbound: Rc::new(RefCell::new(VecDeque::new())),
            sent: SentPackets::new(),
        }
    }

    pub fn push_inbound(&self, datagram: Bytes) {
        self.inbound.borrow_mut().push_back(datagram);
    }
}

impl IceAgent for FakeIceAgent {
    fn reset(&mut self) {
        self.inbound.borrow_mut().clear();
    }

    fn gather_candidates(&mut self) -> Result<()> {
        Ok(())
    }

    fn local_description(&self) -> (IceCredentials, Vec<String>) {
        (
            IceCredentials {
                ufrag: "localufrag".to_string(),
                password: "localpassword".to_string(),
            },
            vec!["1 1 UDP 2130706431 127.0.0.1 9000 typ host".to_string()],
        )
    }

    fn set_remote_description(&mut self, _remote: &RemoteIceDescription) -> Result<()> {
        Ok(())
    }

    fn select_candidate_pair(&mut self) {}

    fn connectivity_check(&mut self) -> Result<bool> {
        if self.checks_until_nominated == 0 {
            return Ok(true);
        }
        self.checks_until_nominated -= 1;
        Ok(self.checks_until_nominated == 0)
    }

    fn recv(&mut self) -> Result<Option<Bytes>> {
        Ok(self.inbound.borrow_mut().pop_front())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        self.sent.0.borrow_mut().push(Bytes::copy_from_slice(data));
        Ok(())
    }
}

/// A DTLS engine that completes its handshake on the first `step()` and
/// hands out pass-through SRTP contexts (no real encryption), so tests can
/// assert on plaintext payloads flowing through the pipeline.
pub struct FakeDtlsEngine {
    pub dtls_state: DtlsState,
    pub contexts_taken: bool,
}

impl FakeDtlsEngine {
    pub fn new() -> Self {
        FakeDtlsEngine {
            dtls_state: DtlsState::Init,
            contexts_taken: false,
        }
    }
}

impl DtlsEngine for FakeDtlsEngine {
    fn reset_session(&mut self) {
        self.dtls_state = DtlsState::Init;
        self.contexts_taken = false;
    }

    fn state(&self) -> DtlsState {
        self.dtls_state
    }

    fn local_fingerprint(&self) -> DtlsFingerprint {
        DtlsFingerprint {
            algorithm: "sha-256".to_string(),
            value: "00:11:22:33".to_string(),
        }
    }

    fn set_remote_fingerprint(&mut self, _fingerprint: DtlsFingerprint) {}

    fn step(&mut self) -> Result<()> {
        self.dtls_state = DtlsState::Connected;
        Ok(())
    }

    fn handle_incoming(&mut self, record: Bytes) -> Result<DtlsEvent> {
        // in this fake, every inbound "DTLS" record not produced during the
        // (instant) handshake is treated as wrapped application data.
        Ok(DtlsEvent::ApplicationData(record))
    }

    fn poll_transmit(&mut self) -> Option<Bytes> {
        None
    }

    fn send_application_data(&mut self, _payload: &[u8]) -> Result<()> {
        Ok(())
    }

    fn take_srtp_contexts(
        &mut self,
    ) -> Option<(Box<dyn SrtpContext>, Box<dyn SrtpContext>)> {
        if self.contexts_taken {
            return None;
        }
        self.contexts_taken = true;
        Some((Box::new(PassthroughSrtp), Box::new(PassthroughSrtp)))
    }
}

/// Identity "encryption": lets tests assert on cleartext payloads without
/// needing a real SRTP implementation.
pub struct PassthroughSrtp;

impl SrtpContext for PassthroughSrtp {
    fn encrypt_rtp(&mut self, packet: &[u8]) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(packet))
    }
    fn decrypt_rtp(&mut self, packet: &[u8]) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(packet))
    }
    fn encrypt_rtcp(&mut self, packet: &[u8]) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(packet))
    }
    fn decrypt_rtcp(&mut self, packet: &[u8]) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(packet))
    }
}

/// Records every outgoing message with its PPID instead of actually
/// framing SCTP DATA chunks.
pub struct FakeSctpEndpoint {
    pub opened: bool,
    pub sent: Rc<RefCell<Vec<(u32, Bytes)>>>,
}

impl FakeSctpEndpoint {
    pub fn new() -> Self {
        FakeSctpEndpoint {
            opened: false,
            sent: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl SctpEndpoint for FakeSctpEndpoint {
    fn is_open(&self) -> bool {
        self.opened
    }

    fn open(&mut self) -> Result<()> {
        self.opened = true;
        Ok(())
    }

    fn handle_incoming(&mut self, packet: &[u8]) -> Result<Vec<SctpEvent>> {
        Ok(vec![SctpEvent::Message(Bytes::copy_from_slice(packet))])
    }

    fn send_message(&mut self, payload: &[u8], ppid: u32) -> Result<()> {
        self.sent
            .borrow_mut()
            .push((ppid, Bytes::copy_from_slice(payload)));
        Ok(())
    }

    fn poll_transmit(&mut self) -> Option<Bytes> {
        None
    }
}

pub struct NoopHandler;
impl rtc_peer::PeerConnectionHandler for NoopHandler {}

/// A handler that records every callback invocation in order, so scenario
/// tests can assert on exactly-once firing and argument values.
#[derive(Default, Clone)]
pub struct RecordingHandler {
    pub state_changes: Rc<RefCell<Vec<rtc_peer::PeerConnectionState>>>,
    pub ice_candidates: Rc<RefCell<Vec<String>>>,
    pub connected_count: Rc<RefCell<u32>>,
    pub tracks: Rc<RefCell<Vec<Bytes>>>,
    pub receiver_loss: Rc<RefCell<Vec<(f32, u32)>>>,
    pub data_channel_messages: Rc<RefCell<Vec<Bytes>>>,
    pub data_channel_opens: Rc<RefCell<u32>>,
    pub data_channel_closes: Rc<RefCell<u32>>,
}

impl rtc_peer::PeerConnectionHandler for RecordingHandler {
    fn on_ice_candidate(&mut self, sdp_text: &str) {
        self.ice_candidates.borrow_mut().push(sdp_text.to_string());
    }

    fn on_ice_connection_state_change(&mut self, new_state: rtc_peer::PeerConnectionState) {
        self.state_changes.borrow_mut().push(new_state);
    }

    fn on_track(&mut self, payload: &[u8]) {
        self.tracks.borrow_mut().push(Bytes::copy_from_slice(payload));
    }

    fn on_connected(&mut self) {
        *self.connected_count.borrow_mut() += 1;
    }

    fn on_receiver_packet_loss(&mut self, fraction: f32, total: u32) {
        self.receiver_loss.borrow_mut().push((fraction, total));
    }

    fn on_data_channel_message(&mut self, message: &[u8]) {
        self.data_channel_messages
            .borrow_mut()
            .push(Bytes::copy_from_slice(message));
    }

    fn on_data_channel_open(&mut self) {
        *self.data_channel_opens.borrow_mut() += 1;
    }

    fn on_data_channel_close(&mut self) {
        *self.data_channel_closes.borrow_mut() += 1;
    }
}
