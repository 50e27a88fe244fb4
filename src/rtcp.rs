//! Minimal RTCP support: just enough Receiver Report parsing to surface
//! loss statistics, and enough Picture Loss Indication construction to back
//! `send_rtcp_pli`. Full RTCP feedback generation beyond these two packet
//! types is out of scope.

use crate::constants::{RTCP_FMT_PLI, RTCP_PT_PSFB, RTCP_PT_RR};
use bytes::{BufMut, Bytes, BytesMut};

const RTCP_HEADER_LEN: usize = 4;
const RR_SENDER_SSRC_LEN: usize = 4;
const REPORT_BLOCK_LEN: usize = 24;

/// Loss statistics extracted from the first report block of a Receiver
/// Report: fraction lost packs into the high byte of the report block's
/// second word, cumulative lost into the low 24 bits (RFC 3550 §6.4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverLoss {
    pub fraction_lost: u8,
    pub cumulative_lost: u32,
}

/// Parses an (already SRTCP-decrypted) RTCP packet as a Receiver Report and
/// extracts loss stats from its first report block, if it carries one.
///
/// Returns `None` for anything that isn't an RR with `rc > 0`: a different
/// packet type, or an RR with zero report blocks.
pub fn parse_receiver_report(buf: &[u8]) -> Option<ReceiverLoss> {
    if buf.len() < RTCP_HEADER_LEN {
        return None;
    }
    let packet_type = buf[1];
    if packet_type != RTCP_PT_RR {
        return None;
    }
    let report_count = buf[0] & 0x1F;
    if report_count == 0 {
        return None;
    }
    let first_block_offset = RTCP_HEADER_LEN + RR_SENDER_SSRC_LEN;
    if buf.len() < first_block_offset + REPORT_BLOCK_LEN {
        return None;
    }
    // The second word of a report block packs fraction-lost (high byte)
    // and cumulative-lost (low 24 bits) into one big-endian u32.
    let flcnpl = u32::from_be_bytes([
        buf[first_block_offset + 4],
        buf[first_block_offset + 5],
        buf[first_block_offset + 6],
        buf[first_block_offset + 7],
    ]);
    Some(ReceiverLoss {
        fraction_lost: (flcnpl >> 24) as u8,
        cumulative_lost: flcnpl & 0x00FF_FFFF,
    })
}

/// Builds a Picture Loss Indication (RFC 4585 §6.3.1) requesting a keyframe
/// for `media_ssrc`. The caller is responsible for SRTCP-encrypting and
/// sending the result; this module never touches the wire.
pub fn build_pli(sender_ssrc: u32, media_ssrc: u32) -> Bytes {
    let mut buf = BytesMut::with_capacity(12);
    // V=2, P=0, FMT=1 (PLI)
    buf.put_u8((2 << 6) | RTCP_FMT_PLI);
    buf.put_u8(RTCP_PT_PSFB);
    buf.put_u16(2); // length in 32-bit words minus one
    buf.put_u32(sender_ssrc);
    buf.put_u32(media_ssrc);
    buf.freeze()
}
