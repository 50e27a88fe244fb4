//! Event surface: a capability trait an embedder implements to observe a
//! [`crate::PeerConnection`]. Every method defaults to a no-op so an
//! embedder implements only the events it cares about.

use crate::state::PeerConnectionState;

/// Registered once at [`crate::PeerConnection::new`]. All methods run
/// synchronously on the thread driving [`crate::PeerConnection::tick`]; an
/// implementation must not call back into the `PeerConnection` from inside
/// one of these (the type system doesn't prevent it — `tick` simply isn't
/// reentrant-safe, and only ever runs one pass of dispatch per call).
pub trait PeerConnectionHandler {
    /// Fired once per `New` cycle with the fully assembled local SDP.
    fn on_ice_candidate(&mut self, _sdp_text: &str) {}

    /// Fired on real state transitions only — never twice in a row with
    /// the same value.
    fn on_ice_connection_state_change(&mut self, _new_state: PeerConnectionState) {}

    /// Decrypted RTP payload for inbound media.
    fn on_track(&mut self, _payload: &[u8]) {}

    /// Fired once when DTLS-SRTP reaches `Connected`.
    fn on_connected(&mut self) {}

    /// Parsed from an inbound Receiver Report; `fraction` is already
    /// normalized to `[0.0, 1.0)` (the report's fraction-lost byte over 256).
    fn on_receiver_packet_loss(&mut self, _fraction: f32, _total: u32) {}

    fn on_data_channel_message(&mut self, _message: &[u8]) {}

    fn on_data_channel_open(&mut self) {}

    fn on_data_channel_close(&mut self) {}
}

/// A handler that ignores everything, useful when an embedder only cares
/// about a couple of events and doesn't want to write empty overrides for
/// the rest — or as the default before a real handler is swapped in.
#[derive(Default)]
pub struct NoopHandler;

impl PeerConnectionHandler for NoopHandler {}
