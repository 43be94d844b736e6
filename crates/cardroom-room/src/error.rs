//! Error types for the room layer.

use cardroom_engine::GameError;
use cardroom_protocol::{PlayerId, RoomCode};

/// Errors that can occur during lobby and registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// A room code or other input was unusable even after sanitizing.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The room already seats two other participants.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The room does not exist.
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// The player is not seated in any room.
    #[error("player {0} is not in a room")]
    NotInRoom(PlayerId),

    /// A forced start was requested without a second participant.
    #[error("waiting for an opponent")]
    NoOpponent,

    /// Every generated room code collided with an existing room.
    #[error("no free room code after {0} attempts")]
    RegistryExhausted(usize),

    /// The engine rejected a draw or play.
    #[error(transparent)]
    Game(#[from] GameError),
}

impl RoomError {
    /// Stable machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::RoomFull(_) => "room_full",
            Self::RoomNotFound(_) | Self::NotInRoom(_) => "room_not_found",
            Self::NoOpponent => "no_opponent",
            Self::RegistryExhausted(_) => "registry_exhausted",
            Self::Game(e) => e.code(),
        }
    }
}
