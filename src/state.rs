use std::fmt;

/// The externally observable lifecycle of a [`crate::PeerConnection`].
///
/// # State Transitions
///
/// ```text
/// New ──remote description set──▶ Checking ──connectivity check ok──▶ Connected
///   │                                 │                                   │
///   └────────────────────────────────────────any──▶ Failed / Closed ◀─────┘
/// ```
///
/// Only four transitions are legal, and [`crate::PeerConnection::tick`]
/// is the only place that performs them:
///
/// - `New → Checking`, on [`crate::PeerConnection::set_remote_description`].
/// - `Checking → Connected`, once the ICE agent reports a successful
///   connectivity check.
/// - any state `→ Failed`, on an unrecoverable transport error.
/// - any state `→ Closed`, on explicit teardown.
///
/// `Completed` and `Disconnected` are reserved for a richer ICE restart /
/// renegotiation story than this core implements; the loop treats them as
/// terminal no-ops today, same as `Failed` and `Closed`.
///
/// Every *actual* transition invokes the registered
/// [`crate::PeerConnectionHandler::on_ice_connection_state_change`] exactly
/// once; re-entering the same state (which cannot happen via the transitions
/// above, but guards against a future state being wired up carelessly) never
/// fires the callback twice in a row with equal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerConnectionState {
    New,
    Checking,
    Connected,
    Completed,
    Failed,
    Disconnected,
    Closed,
}

impl Default for PeerConnectionState {
    fn default() -> Self {
        PeerConnectionState::New
    }
}

impl PeerConnectionState {
    /// A peer in this state has already been torn down and must not be
    /// driven with `tick` again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PeerConnectionState::Closed)
    }
}

impl fmt::Display for PeerConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PeerConnectionState::New => "new",
            PeerConnectionState::Checking => "checking",
            PeerConnectionState::Connected => "connected",
            PeerConnectionState::Completed => "completed",
            PeerConnectionState::Failed => "failed",
            PeerConnectionState::Disconnected => "disconnected",
            PeerConnectionState::Closed => "closed",
        };
        write!(f, "{s}")
    }
}
