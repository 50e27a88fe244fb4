//! SDP builder: assembles the local offer and parses a remote answer,
//! covering only the mandatory attributes this core needs. This is a small,
//! explicit line-oriented writer and a tolerant line-oriented scanner
//! rather than a full SDP grammar — the narrow mandatory-attribute subset
//! doesn't need one, and a tolerant scanner (ignore what you don't
//! recognize) is the idiomatic choice for a text protocol this core
//! doesn't own the other side of.

use crate::collaborators::{DtlsFingerprint, IceCredentials, RemoteIceDescription};
use crate::error::{Error, Result};
use crate::options::PeerOptions;
use std::fmt::Write as _;

/// The negotiated (or, before negotiation, offered) DTLS role (RFC 8842).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupRole {
    ActPass,
    Active,
    Passive,
}

impl SetupRole {
    fn as_str(&self) -> &'static str {
        match self {
            SetupRole::ActPass => "actpass",
            SetupRole::Active => "active",
            SetupRole::Passive => "passive",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "actpass" => Some(SetupRole::ActPass),
            "active" => Some(SetupRole::Active),
            "passive" => Some(SetupRole::Passive),
            _ => None,
        }
    }
}

/// Which `m=` sections are present, independent of which codec backs them
/// — a remote answer may reject a medium by port 0, but this core treats
/// presence/absence of the line as the signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MediaSections {
    pub audio: bool,
    pub video: bool,
    pub data: bool,
}

/// The locally assembled offer: the text blob handed to
/// `on_ice_candidate`, plus the structured ICE/DTLS bindings parsed back out
/// of it for local use.
#[derive(Debug, Clone)]
pub struct LocalSessionDescription {
    pub sdp_text: String,
    pub ice: IceCredentials,
    pub fingerprint: DtlsFingerprint,
    pub setup: SetupRole,
    pub media: MediaSections,
}

/// The structured bindings pulled out of a remote SDP.
#[derive(Debug, Clone, Default)]
pub struct RemoteSessionDescription {
    pub ice: RemoteIceDescription,
    pub fingerprint: DtlsFingerprint,
    pub setup: SetupRole,
    pub media: MediaSections,
}

impl Default for SetupRole {
    fn default() -> Self {
        SetupRole::ActPass
    }
}

/// Builds the local offer. `session_id` should be a fresh random/monotonic
/// value per `New` cycle; the caller (the peer state machine) owns that
/// policy, this function just writes it out.
pub fn build_offer(
    options: &PeerOptions,
    session_id: u64,
    ice: &IceCredentials,
    candidates: &[String],
    fingerprint: &DtlsFingerprint,
) -> LocalSessionDescription {
    use crate::constants::{H264_PAYLOAD_TYPE, PCMA_CLOCK_RATE, PCMA_PAYLOAD_TYPE};
    use crate::options::{AudioCodec, VideoCodec};

    let media = MediaSections {
        audio: options.audio_codec != AudioCodec::None,
        video: options.video_codec != VideoCodec::None,
        data: options.datachannel.is_enabled(),
    };

    let mut sdp = String::new();
    let _ = writeln!(sdp, "v=0");
    let _ = writeln!(sdp, "o=- {session_id} 2 IN IP4 0.0.0.0");
    let _ = writeln!(sdp, "s=-");
    let _ = writeln!(sdp, "t=0 0");
    let _ = writeln!(sdp, "a=ice-ufrag:{}", ice.ufrag);
    let _ = writeln!(sdp, "a=ice-pwd:{}", ice.password);
    for candidate in candidates {
        let _ = writeln!(sdp, "a=candidate:{candidate}");
    }
    let _ = writeln!(sdp, "a=fingerprint:{} {}", fingerprint.algorithm, fingerprint.value);
    let _ = writeln!(sdp, "a=setup:{}", SetupRole::ActPass.as_str());

    if media.video {
        let _ = writeln!(sdp, "m=video 9 UDP/TLS/RTP/SAVPF {H264_PAYLOAD_TYPE}");
        let _ = writeln!(sdp, "a=rtpmap:{H264_PAYLOAD_TYPE} H264/90000");
    }
    if media.audio {
        let _ = writeln!(sdp, "m=audio 9 UDP/TLS/RTP/SAVPF {PCMA_PAYLOAD_TYPE}");
        let _ = writeln!(
            sdp,
            "a=rtpmap:{PCMA_PAYLOAD_TYPE} PCMA/{PCMA_CLOCK_RATE}"
        );
    }
    if media.data {
        let _ = writeln!(sdp, "m=application 9 UDP/DTLS/SCTP webrtc-datachannel");
    }

    LocalSessionDescription {
        sdp_text: sdp,
        ice: ice.clone(),
        fingerprint: fingerprint.clone(),
        setup: SetupRole::ActPass,
        media,
    }
}

/// Parses a remote SDP (typically an answer) into the structured bindings
/// this core needs. Tolerant of attributes it doesn't recognize; fails only
/// when a *mandatory* attribute (ice-ufrag, ice-pwd, fingerprint) is
/// missing entirely.
pub fn parse_remote(sdp_text: &str) -> Result<RemoteSessionDescription> {
    let mut ice = RemoteIceDescription::default();
    let mut fingerprint = DtlsFingerprint::default();
    let mut setup = SetupRole::ActPass;
    let mut media = MediaSections::default();

    for line in sdp_text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("a=ice-ufrag:") {
            ice.credentials.ufrag = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("a=ice-pwd:") {
            ice.credentials.password = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("a=candidate:") {
            ice.candidates.push(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("a=fingerprint:") {
            if let Some((algo, value)) = rest.trim().split_once(' ') {
                fingerprint.algorithm = algo.to_string();
                fingerprint.value = value.to_string();
            }
        } else if let Some(rest) = line.strip_prefix("a=setup:") {
            if let Some(role) = SetupRole::parse(rest.trim()) {
                setup = role;
            }
        } else if line.starts_with("m=video") {
            media.video = true;
        } else if line.starts_with("m=audio") {
            media.audio = true;
        } else if line.starts_with("m=application") {
            media.data = true;
        }
    }

    if ice.credentials.ufrag.is_empty() || ice.credentials.password.is_empty() {
        return Err(Error::ProtocolInvalid);
    }
    if fingerprint.value.is_empty() {
        return Err(Error::ProtocolInvalid);
    }

    Ok(RemoteSessionDescription {
        ice,
        fingerprint,
        setup,
        media,
    })
}
