//! Minimal RTP header encode/decode. The real codec-specific packetization
//! (H.264 NAL splitting, PCMA framing) lives in [`crate::packetizer`]; this
//! module only owns the twelve-byte fixed header (RFC 3550 §5.1) that every
//! packetizer needs to stamp.

use bytes::{BufMut, Bytes, BytesMut};

pub const RTP_HEADER_LEN: usize = 12;
const RTP_VERSION: u8 = 2;

/// The fixed 12-byte RTP header. Extension headers and CSRC lists are out
/// of scope for this core's packetizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RtpHeader {
    pub marker: bool,
    pub payload_type: u8,
    pub sequence_number: u16,
    pub timestamp: u32,
    pub ssrc: u32,
}

impl RtpHeader {
    pub fn marshal(&self, payload: &[u8]) -> Bytes {
        let mut buf = BytesMut::with_capacity(RTP_HEADER_LEN + payload.len());
        buf.put_u8((RTP_VERSION << 6) & 0xC0);
        buf.put_u8((self.marker as u8) << 7 | (self.payload_type & 0x7F));
        buf.put_u16(self.sequence_number);
        buf.put_u32(self.timestamp);
        buf.put_u32(self.ssrc);
        buf.extend_from_slice(payload);
        buf.freeze()
    }

    /// Checks only enough of the header to know it was well-formed. Full
    /// field extraction isn't required because the ingress path forwards
    /// the decrypted *payload*, not a parsed struct, to `on_track`.
    pub fn validate(buf: &[u8]) -> bool {
        if buf.len() < RTP_HEADER_LEN {
            return false;
        }
        (buf[0] >> 6) == RTP_VERSION
    }
}
