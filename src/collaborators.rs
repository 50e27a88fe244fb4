//! Trait-level interfaces for the ICE agent, the DTLS/SRTP engines, and the
//! SCTP stack: the collaborators are plain owned trait objects that
//! [`crate::PeerConnection`] calls directly, rather than going through a
//! back-pointer or global handle.
//!
//! Each trait is sans-io: no collaborator ever touches a socket or a clock
//! on its own. A production embedder backs these with real cryptography and
//! a real UDP socket; tests back them with deterministic fakes (see
//! `tests/common`).

use crate::error::Result;
use bytes::Bytes;

/// ICE credentials (RFC 8839 §5.4), exchanged in SDP as `a=ice-ufrag` /
/// `a=ice-pwd`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IceCredentials {
    pub ufrag: String,
    pub password: String,
}

/// Structured view of the ICE-relevant fields pulled out of a remote SDP by
/// [`crate::sdp::parse_remote`], handed to [`IceAgent::set_remote_description`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteIceDescription {
    pub credentials: IceCredentials,
    pub candidates: Vec<String>,
}

/// The ICE/STUN agent collaborator. Owns UDP socket(s), candidate
/// gathering, connectivity checks, and the selected candidate pair; this
/// core only calls it, never reimplements it.
pub trait IceAgent {
    /// Resets gathered candidates and any nominated/selected pair. Called
    /// whenever the peer (re-)enters `New`.
    fn reset(&mut self);

    /// Starts gathering local candidates. Trickle-ICE (incremental
    /// candidate delivery) is a non-goal; this core expects gathering to
    /// complete synchronously enough to read back via
    /// [`Self::local_description`] in the same `tick`.
    fn gather_candidates(&mut self) -> Result<()>;

    /// The local ICE ufrag/password and gathered candidate lines, ready to
    /// paste into an SDP body.
    fn local_description(&self) -> (IceCredentials, Vec<String>);

    /// Applies the remote ufrag/password/candidates parsed from the
    /// answer's SDP.
    fn set_remote_description(&mut self, remote: &RemoteIceDescription) -> Result<()>;

    /// Picks (or re-picks) a candidate pair to run a connectivity check
    /// against. A no-op if one is already nominated.
    fn select_candidate_pair(&mut self);

    /// Runs one connectivity check against the selected pair. Returns
    /// `true` once a pair has been nominated and the check has succeeded.
    fn connectivity_check(&mut self) -> Result<bool>;

    /// Non-blocking receive. `Ok(None)` means no datagram was waiting.
    fn recv(&mut self) -> Result<Option<Bytes>>;

    /// Sends a raw datagram over the selected candidate pair.
    fn send(&mut self, data: &[u8]) -> Result<()>;
}

/// DTLS handshake state: awaiting completion, connected, or failed
/// irrecoverably.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtlsState {
    Init,
    Connected,
    Failed,
}

/// A certificate fingerprint bound into SDP (`a=fingerprint:sha-256 ...`)
/// and checked against the peer certificate presented at handshake time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DtlsFingerprint {
    pub algorithm: String,
    pub value: String,
}

/// What feeding one inbound DTLS record into the engine produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DtlsEvent {
    /// The record was consumed by the handshake state machine; nothing
    /// else to do this tick.
    None,
    /// The handshake just completed. The caller must retrieve SRTP keying
    /// material via [`DtlsEngine::take_srtp_contexts`] before any RTP/RTCP
    /// can be encrypted or decrypted.
    HandshakeComplete,
    /// Decrypted DTLS application data — always an SCTP packet in this
    /// core, since the data channel is the only thing carried over DTLS
    /// application data.
    ApplicationData(Bytes),
}

/// The DTLS-SRTP engine collaborator: owns the certificate, the handshake
/// state machine, and record encryption. Runs in the server role, since
/// this core always answers rather than initiates the handshake.
pub trait DtlsEngine {
    /// Resets handshake state. Called whenever the peer re-enters `New`.
    fn reset_session(&mut self);

    fn state(&self) -> DtlsState;

    /// The local certificate's SHA-256 fingerprint, bound into the local
    /// SDP's `a=fingerprint` line.
    fn local_fingerprint(&self) -> DtlsFingerprint;

    /// Binds the fingerprint advertised in the remote SDP so the engine can
    /// verify it against the certificate actually presented during the
    /// handshake.
    fn set_remote_fingerprint(&mut self, fingerprint: DtlsFingerprint);

    /// Drives one handshake step (e.g. a retransmit-timer check). Called
    /// at most once per `tick` while `state() == Init`.
    fn step(&mut self) -> Result<()>;

    /// Feeds one inbound DTLS record (already classified by
    /// [`crate::classifier`]).
    fn handle_incoming(&mut self, record: Bytes) -> Result<DtlsEvent>;

    /// Drains one queued outgoing DTLS record (handshake flight or wrapped
    /// application data) to hand to the [`IceAgent`].
    fn poll_transmit(&mut self) -> Option<Bytes>;

    /// Wraps `payload` as an outgoing DTLS application-data record (used to
    /// carry SCTP packets); retrievable afterwards via `poll_transmit`.
    fn send_application_data(&mut self, payload: &[u8]) -> Result<()>;

    /// Takes ownership of the (local, remote) SRTP keying contexts derived
    /// from the just-completed handshake. Returns `None` if called again
    /// after the first take, or before the handshake has completed.
    fn take_srtp_contexts(&mut self) -> Option<(Box<dyn SrtpContext>, Box<dyn SrtpContext>)>;
}

/// One direction (local-encrypt or remote-decrypt) of SRTP/SRTCP keying
/// material, handed out by [`DtlsEngine::take_srtp_contexts`].
pub trait SrtpContext {
    fn encrypt_rtp(&mut self, packet: &[u8]) -> Result<Bytes>;
    fn decrypt_rtp(&mut self, packet: &[u8]) -> Result<Bytes>;
    fn encrypt_rtcp(&mut self, packet: &[u8]) -> Result<Bytes>;
    fn decrypt_rtcp(&mut self, packet: &[u8]) -> Result<Bytes>;
}

/// One event surfaced while feeding bytes into an [`SctpEndpoint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SctpEvent {
    Open,
    Message(Bytes),
    Close,
}

/// The SCTP-over-DTLS user-mode stack collaborator, carrying data-channel
/// messages once DTLS application data starts flowing.
pub trait SctpEndpoint {
    fn is_open(&self) -> bool;

    /// Creates the association. Called once, right after the DTLS
    /// handshake completes, only when data channels are enabled.
    fn open(&mut self) -> Result<()>;

    /// Feeds one decrypted DTLS application-data payload (a raw SCTP
    /// packet) into the association.
    fn handle_incoming(&mut self, packet: &[u8]) -> Result<Vec<SctpEvent>>;

    /// Queues an outgoing user message tagged with `ppid`
    /// ([`crate::constants::PPID_STRING`] or
    /// [`crate::constants::PPID_BINARY`]).
    fn send_message(&mut self, payload: &[u8], ppid: u32) -> Result<()>;

    /// Drains one queued outgoing SCTP packet to be wrapped in DTLS
    /// application data and sent.
    fn poll_transmit(&mut self) -> Option<Bytes>;
}

/// Fragments one complete access unit (a full audio sample block or a full
/// video frame) into one or more unencrypted RTP packets. Codec-specific
/// (H.264 NAL splitting, PCMA framing); SRTP encryption and transport
/// handoff happen after packetization, in [`crate::peer`]'s egress
/// pipeline.
pub trait RtpPacketizer {
    fn packetize(&mut self, access_unit: &[u8]) -> Vec<Bytes>;
}
