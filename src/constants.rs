//! Magic numbers pulled out of the dispatch/classification logic so the
//! RFC references live in one place.

/// Typical UDP path MTU; inbound datagrams are read into a buffer of this
/// size.
pub const RECEIVE_MTU: usize = 1460;

/// First-byte range (inclusive) that [RFC 7983] reserves for STUN.
///
/// [RFC 7983]: https://tools.ietf.org/html/rfc7983
pub const STUN_RANGE: (u8, u8) = (0, 3);

/// First-byte range (inclusive) that RFC 7983 reserves for DTLS records.
pub const DTLS_RANGE: (u8, u8) = (20, 63);

/// First-byte range (inclusive) that RFC 7983 reserves for RTP/RTCP.
pub const RTP_RTCP_RANGE: (u8, u8) = (128, 191);

/// RTCP payload-type range used to distinguish RTCP from RTP within the
/// shared `[128,191]` first-byte band (RFC 5761 §4): payload types
/// 192-223 are compound/feedback RTCP, everything else in-range is RTP.
pub const RTCP_PT_RANGE: (u8, u8) = (192, 223);

/// RTCP packet type for a Receiver Report (RFC 3550 §6.4.2).
pub const RTCP_PT_RR: u8 = 201;

/// RTCP packet type for Payload-Specific Feedback (RFC 4585), which PLI is
/// carried inside.
pub const RTCP_PT_PSFB: u8 = 206;

/// RTCP feedback message type for Picture Loss Indication (RFC 4585 §6.3.1).
pub const RTCP_FMT_PLI: u8 = 1;

/// Minimum bytes needed to read a STUN header.
pub const MIN_STUN_LEN: usize = 20;

/// Minimum bytes needed to read a DTLS record header.
pub const MIN_DTLS_LEN: usize = 13;

/// Minimum bytes needed to read an RTP or RTCP header.
pub const MIN_RTP_LEN: usize = 8;

/// SCTP payload protocol identifier for a UTF-8 data-channel message
/// (draft-ietf-rtcweb-data-protocol).
pub const PPID_STRING: u32 = 51;

/// SCTP payload protocol identifier for a binary data-channel message.
pub const PPID_BINARY: u32 = 53;

/// Default per-medium ring buffer depth, in frames, when `PeerOptions`
/// doesn't override it.
pub const DEFAULT_RING_CAPACITY: usize = 32;

/// Upper bound, in ticks, on how long `PeerConnection` will poll the DTLS
/// handshake sub-phase before giving up and transitioning to `Failed`. At
/// one attempt per `tick`, this bounds the wall-clock an embedder might
/// spend stuck mid-handshake.
pub const MAX_HANDSHAKE_POLL_ATTEMPTS: u32 = 10_000;

/// Audio RTP clock rate for PCMA (ITU-T G.711 A-law), in Hz.
pub const PCMA_CLOCK_RATE: u32 = 8_000;

/// Static RTP payload type assigned to PCMA by RFC 3551.
pub const PCMA_PAYLOAD_TYPE: u8 = 8;

/// Dynamic RTP payload type this core assigns to H.264 (no static
/// assignment exists; 96 is the first dynamic PT per RFC 3551).
pub const H264_PAYLOAD_TYPE: u8 = 96;

/// Maximum RTP payload size per packet before the packetizer fragments an
/// access unit into multiple packets (MTU minus worst-case header
/// overhead).
pub const MAX_RTP_PAYLOAD_SIZE: usize = RECEIVE_MTU - 54;
