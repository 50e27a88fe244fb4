//! Concrete [`RtpPacketizer`] implementations for the two codecs this core
//! knows how to frame: PCMA (trivial, one sample block per packet) and
//! H.264 (NAL-aware, with RFC 6184 FU-A fragmentation for NALs that don't
//! fit in one packet). Encoding/decoding the media itself is out of scope;
//! these only stamp RTP headers around access units the caller already
//! produced.

use crate::collaborators::RtpPacketizer;
use crate::constants::{H264_PAYLOAD_TYPE, MAX_RTP_PAYLOAD_SIZE, PCMA_PAYLOAD_TYPE};
use crate::rtp::RtpHeader;
use bytes::Bytes;

/// One RTP packet per call: PCMA carries no internal framing, so an access
/// unit (one sample block) always fits a single packet at typical sizes.
/// `timestamp` advances by the sample count, matching RFC 3551's
/// one-tick-per-sample clock for G.711.
pub struct PcmaPacketizer {
    ssrc: u32,
    sequence_number: u16,
    timestamp: u32,
}

impl PcmaPacketizer {
    pub fn new(ssrc: u32) -> Self {
        PcmaPacketizer {
            ssrc,
            sequence_number: 0,
            timestamp: 0,
        }
    }
}

impl RtpPacketizer for PcmaPacketizer {
    fn packetize(&mut self, access_unit: &[u8]) -> Vec<Bytes> {
        let header = RtpHeader {
            marker: true,
            payload_type: PCMA_PAYLOAD_TYPE,
            sequence_number: self.sequence_number,
            timestamp: self.timestamp,
            ssrc: self.ssrc,
        };
        self.sequence_number = self.sequence_number.wrapping_add(1);
        self.timestamp = self.timestamp.wrapping_add(access_unit.len() as u32);
        vec![header.marshal(access_unit)]
    }
}

const NAL_TYPE_FU_A: u8 = 28;
const FU_HEADER_LEN: usize = 2;

/// Splits an access unit (one encoded video frame, Annex-B NAL stream) on
/// `00 00 01` / `00 00 00 01` start codes, then fragments any NAL larger
/// than [`MAX_RTP_PAYLOAD_SIZE`] using FU-A (RFC 6184 §5.8). The marker bit
/// is set only on the last packet of the last NAL, signalling frame
/// boundary per RFC 6184 §5.1.
pub struct H264Packetizer {
    ssrc: u32,
    sequence_number: u16,
    timestamp: u32,
}

impl H264Packetizer {
    pub fn new(ssrc: u32) -> Self {
        H264Packetizer {
            ssrc,
            sequence_number: 0,
            timestamp: 0,
        }
    }

    fn next_header(&mut self, marker: bool) -> RtpHeader {
        let header = RtpHeader {
            marker,
            payload_type: H264_PAYLOAD_TYPE,
            sequence_number: self.sequence_number,
            timestamp: self.timestamp,
            ssrc: self.ssrc,
        };
        self.sequence_number = self.sequence_number.wrapping_add(1);
        header
    }

    fn fragment_nal(&mut self, nal: &[u8], is_last_nal: bool) -> Vec<Bytes> {
        if nal.is_empty() {
            return Vec::new();
        }
        if nal.len() <= MAX_RTP_PAYLOAD_SIZE {
            let header = self.next_header(is_last_nal);
            return vec![header.marshal(nal)];
        }

        let fu_indicator = (nal[0] & 0xE0) | NAL_TYPE_FU_A;
        let nal_header_type = nal[0] & 0x1F;
        let payload = &nal[1..];
        let chunk_size = MAX_RTP_PAYLOAD_SIZE - FU_HEADER_LEN;
        let chunks: Vec<&[u8]> = payload.chunks(chunk_size).collect();
        let last_index = chunks.len().saturating_sub(1);

        chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let start = index == 0;
                let end = index == last_index;
                let mut fu_header = nal_header_type;
                if start {
                    fu_header |= 0x80;
                }
                if end {
                    fu_header |= 0x40;
                }
                let mut payload_buf = Vec::with_capacity(FU_HEADER_LEN + chunk.len());
                payload_buf.push(fu_indicator);
                payload_buf.push(fu_header);
                payload_buf.extend_from_slice(chunk);
                let header = self.next_header(end && is_last_nal);
                header.marshal(&payload_buf)
            })
            .collect()
    }
}

/// Splits an Annex-B byte stream into its constituent NAL units, stripping
/// start codes.
fn split_nals(access_unit: &[u8]) -> Vec<&[u8]> {
    let mut nals = Vec::new();
    let mut offset = 0;
    let mut start = None;

    while offset < access_unit.len() {
        let remaining = &access_unit[offset..];
        let code_len = if remaining.starts_with(&[0, 0, 0, 1]) {
            Some(4)
        } else if remaining.starts_with(&[0, 0, 1]) {
            Some(3)
        } else {
            None
        };
        if let Some(len) = code_len {
            if let Some(s) = start {
                nals.push(&access_unit[s..offset]);
            }
            offset += len;
            start = Some(offset);
        } else {
            offset += 1;
        }
    }
    if let Some(s) = start {
        nals.push(&access_unit[s..]);
    }
    nals
}

impl RtpPacketizer for H264Packetizer {
    fn packetize(&mut self, access_unit: &[u8]) -> Vec<Bytes> {
        let nals = split_nals(access_unit);
        let last_nal_index = nals.len().saturating_sub(1);
        let mut packets = Vec::new();
        for (index, nal) in nals.into_iter().enumerate() {
            packets.extend(self.fragment_nal(nal, index == last_nal_index));
        }
        // advance the RTP clock by one frame interval (90kHz, caller-paced)
        self.timestamp = self.timestamp.wrapping_add(3_000);
        packets
    }
}
