use crate::constants::DEFAULT_RING_CAPACITY;

/// Audio codec a `PeerConnection` may be configured to send/receive.
///
/// An extensible tag set in name only today: PCMA is the only variant this
/// core packetizes, but the type exists so new codecs are additive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AudioCodec {
    #[default]
    None,
    Pcma,
}

/// Video codec a `PeerConnection` may be configured to send/receive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum VideoCodec {
    #[default]
    None,
    H264,
}

/// Data channel mode, mirroring the SCTP payload protocol identifiers a
/// message is tagged with on the wire.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DataChannelMode {
    #[default]
    Disabled,
    String,
    Binary,
}

impl DataChannelMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, DataChannelMode::Disabled)
    }
}

/// Immutable configuration captured at [`crate::PeerConnection::new`].
///
/// Every field here is read once at construction time to decide which ring
/// buffers and packetizers to allocate; nothing in the peer connection
/// mutates it afterwards.
#[derive(Debug, Clone)]
pub struct PeerOptions {
    pub audio_codec: AudioCodec,
    pub video_codec: VideoCodec,
    pub datachannel: DataChannelMode,
    /// Per-medium ring buffer depth, in frames. Defaults to
    /// [`DEFAULT_RING_CAPACITY`] when left at `0` by `Default`.
    pub ring_capacity: usize,
}

impl Default for PeerOptions {
    fn default() -> Self {
        PeerOptions {
            audio_codec: AudioCodec::default(),
            video_codec: VideoCodec::default(),
            datachannel: DataChannelMode::default(),
            ring_capacity: DEFAULT_RING_CAPACITY,
        }
    }
}

impl PeerOptions {
    /// Validates a configuration before it is allowed to back a
    /// `PeerConnection`, surfacing `ConfigError` rather than letting a
    /// degenerate value (e.g. a zero-capacity ring buffer) panic later.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.ring_capacity == 0 {
            return Err(crate::error::Error::ConfigError(
                "ring_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
