//! Room configuration and the room phase state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Limits and defaults shared by every room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Maximum participants per room.
    pub max_players: usize,

    /// Cards dealt to each participant.
    pub hand_size: usize,

    /// Length of generated room codes.
    pub code_len: usize,

    /// How many generated codes to try before giving up on a create.
    pub code_attempts: usize,

    /// Characters kept from a display name.
    pub name_max_chars: usize,

    /// Name used when a display name sanitizes to nothing.
    pub default_name: String,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 2,
            hand_size: 7,
            code_len: 6,
            code_attempts: 50,
            name_max_chars: 24,
            default_name: "Player".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// Where a room is in its lifecycle.
///
/// ```text
/// Empty → Waiting → Full → InProgress → Finished
///            ↑        ↑         │           │
///            └────────┴─────────┴───────────┘   (leave / rematch)
/// ```
///
/// - **Empty**: no participants. The registry deletes rooms in this
///   phase, so it is only ever observed transiently.
/// - **Waiting**: one participant.
/// - **Full**: two participants, no game dealt.
/// - **InProgress**: a game is dealt and has no winner yet.
/// - **Finished**: the last game has a winner. Kept until both ready up
///   again, someone forces a start, or someone leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomPhase {
    Empty,
    Waiting,
    Full,
    InProgress,
    Finished,
}

impl RoomPhase {
    /// Returns `true` if readying up may deal a new game.
    pub fn can_deal(&self) -> bool {
        matches!(self, Self::Full | Self::Finished)
    }
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty"),
            Self::Waiting => write!(f, "Waiting"),
            Self::Full => write!(f, "Full"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
