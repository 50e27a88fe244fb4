//! Packet classifier: routes an inbound datagram to RTCP / DTLS / RTP /
//! STUN handling based on RFC 7983's first-byte demultiplexing rule, with
//! an additional split of the SRTP band into RTP vs RTCP by payload type
//! per RFC 5761 §4.

use crate::constants::{
    DTLS_RANGE, MIN_DTLS_LEN, MIN_RTP_LEN, MIN_STUN_LEN, RTCP_PT_RANGE, RTP_RTCP_RANGE,
    STUN_RANGE,
};
use bytes::Bytes;

/// The tagged result of classifying one inbound datagram. An exhaustive
/// match target, so dispatch on datagram kind can't silently miss a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    Stun(Bytes),
    Dtls(Bytes),
    Rtp(Bytes),
    Rtcp(Bytes),
    /// Failed classification or minimum-length validation; the caller
    /// drops it silently (optionally counting it).
    Drop,
}

fn in_range(b: u8, range: (u8, u8)) -> bool {
    b >= range.0 && b <= range.1
}

/// Classifies a datagram by its leading bytes. Total over every possible
/// first byte, including an empty buffer (always `Drop`).
pub fn classify(buf: Bytes) -> Incoming {
    let Some(&first) = buf.first() else {
        return Incoming::Drop;
    };

    if in_range(first, STUN_RANGE) {
        if buf.len() < MIN_STUN_LEN {
            return Incoming::Drop;
        }
        return Incoming::Stun(buf);
    }

    if in_range(first, DTLS_RANGE) {
        if buf.len() < MIN_DTLS_LEN {
            return Incoming::Drop;
        }
        return Incoming::Dtls(buf);
    }

    if in_range(first, RTP_RTCP_RANGE) {
        if buf.len() < MIN_RTP_LEN {
            return Incoming::Drop;
        }
        // RTP-version bits (the top two bits of byte 0) must read `10`
        // for either RTP or RTCP; RTP_RTCP_RANGE already guarantees that
        // for every value in [128,191]. Byte 1 is compared unmasked: an
        // RTCP packet type never sets a marker bit, and this core's RTP
        // payload types (8, 96) stay low enough that a marker-set RTP
        // byte never lands in RTCP_PT_RANGE either.
        let payload_type = buf[1];
        if in_range(payload_type, RTCP_PT_RANGE) {
            return Incoming::Rtcp(buf);
        }
        return Incoming::Rtp(buf);
    }

    Incoming::Drop
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Classifier totality — every byte prefix in [0,255] maps to exactly
    /// one tag.
    #[test]
    fn classifier_is_total_over_every_first_byte() {
        for first in 0u8..=255 {
            // Use a length long enough to pass every path's minimum-length
            // check so we're only exercising the byte-range decision.
            let mut bytes = vec![first; 24];
            if in_range(first, RTP_RTCP_RANGE) {
                bytes[1] = 201; // force an RTCP-range payload type sometimes
            }
            let result = classify(Bytes::from(bytes));
            match result {
                Incoming::Stun(_) | Incoming::Dtls(_) | Incoming::Rtp(_) | Incoming::Rtcp(_)
                | Incoming::Drop => {}
            }
        }
    }

    #[test]
    fn empty_buffer_always_drops() {
        assert_eq!(classify(Bytes::new()), Incoming::Drop);
    }

    #[test]
    fn short_stun_candidate_drops_on_length() {
        let buf = Bytes::from_static(&[0u8; 4]);
        assert_eq!(classify(buf), Incoming::Drop);
    }

    #[test]
    fn classifies_dtls_record() {
        let mut bytes = vec![22u8]; // DTLS handshake content type
        bytes.extend_from_slice(&[0u8; 20]);
        assert!(matches!(classify(Bytes::from(bytes)), Incoming::Dtls(_)));
    }

    #[test]
    fn classifies_rtp_vs_rtcp_by_payload_type() {
        let mut rtp = vec![0x80u8, 0x60]; // version 10, PT 96 (dynamic, not RTCP range)
        rtp.extend_from_slice(&[0u8; 10]);
        assert!(matches!(classify(Bytes::from(rtp)), Incoming::Rtp(_)));

        let mut rtcp = vec![0x80u8, 201]; // PT 201 == RR
        rtcp.extend_from_slice(&[0u8; 10]);
        assert!(matches!(classify(Bytes::from(rtcp)), Incoming::Rtcp(_)));
    }

    #[test]
    fn fuzz_like_1000_random_12_byte_datagrams_never_panics() {
        // Pre-handshake classifier robustness.
        let mut state = 0x2545F4914F6CDD1Du64;
        for _ in 0..1000 {
            // xorshift64*, good enough for a deterministic smoke fuzz
            state ^= state >> 12;
            state ^= state << 25;
            state ^= state >> 27;
            let word = state.wrapping_mul(0x2545F4914F6CDD1D);
            let bytes: [u8; 8] = word.to_le_bytes();
            let mut buf = bytes.to_vec();
            buf.extend_from_slice(&bytes);
            let _ = classify(Bytes::from(buf));
        }
    }
}
