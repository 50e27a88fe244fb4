use thiserror::Error;

/// Crate-wide result alias, following the convention the rest of the `rtc`
/// workspace uses for its own `shared::error::Result`.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the peer connection core.
///
/// Variants name *kinds* of failure rather than individual call sites, so a
/// caller can match on them without needing to know which internal path
/// produced the error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A send was attempted before DTLS-SRTP (and, for data channels, SCTP)
    /// reached a ready state.
    #[error("not connected")]
    NotConnected,

    /// A ring buffer rejected a frame because it was full. The frame is
    /// dropped; the caller is expected to back off or drop it itself.
    #[error("ring buffer overflow")]
    Overflow,

    /// An inbound datagram failed classification or minimum-length
    /// validation. Never fatal to the connection.
    #[error("malformed inbound datagram")]
    ProtocolInvalid,

    /// The DTLS handshake failed irrecoverably.
    #[error("dtls handshake failed: {0}")]
    HandshakeFailed(String),

    /// ICE connectivity checks exhausted every candidate pair.
    #[error("ice connectivity failed: {0}")]
    IceFailed(String),

    /// Construction-time configuration was invalid.
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// The peer connection has already been closed.
    #[error("peer connection already closed")]
    AlreadyClosed,

    /// Wraps an error surfaced by an `IceAgent`, `DtlsEngine`, or
    /// `SctpEndpoint` collaborator that doesn't map onto a more specific
    /// variant above.
    #[error("transport error: {0}")]
    Transport(String),
}
