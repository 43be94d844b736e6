//! Unified error type for the cardroom server.

use cardroom_gateway::GatewayError;
use cardroom_protocol::ProtocolError;
use cardroom_room::RoomError;
use cardroom_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CardroomError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame or payload that could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A lobby, registry or engine rejection.
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A connection bookkeeping error.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A frame named an event nobody handles.
    #[error("unknown event {0:?}")]
    UnknownEvent(String),

    /// The dispatcher task is gone.
    #[error("dispatcher unavailable")]
    DispatcherClosed,
}

impl CardroomError {
    /// Stable machine-readable code sent to clients in `game:error`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Room(e) => e.code(),
            Self::UnknownEvent(_) => "unknown_event",
            Self::Protocol(_) | Self::Gateway(_) => "invalid_input",
            Self::Transport(_) | Self::DispatcherClosed => "unavailable",
        }
    }
}
