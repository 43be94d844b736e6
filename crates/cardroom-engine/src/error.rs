//! Error types for the game engine.

use cardroom_protocol::{CardId, PlayerId};

/// A rejected draw or play. The table is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// No game is dealt, or the current one already has a winner.
    #[error("no game is running")]
    GameNotRunning,

    /// The acting player does not hold the turn.
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    /// The card is not in the acting player's hand.
    #[error("card {0} is not in hand")]
    CardNotInHand(CardId),

    /// The card matches neither the active color nor the top card's rank.
    #[error("card {0} cannot be played now")]
    IllegalMove(CardId),

    /// A wild card was played without naming one of the four colors.
    #[error("card {0} needs a color selection")]
    MissingColorSelection(CardId),
}

impl GameError {
    /// Stable machine-readable code sent to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Self::GameNotRunning => "game_not_running",
            Self::NotYourTurn(_) => "not_your_turn",
            Self::CardNotInHand(_) => "card_not_in_hand",
            Self::IllegalMove(_) => "illegal_move",
            Self::MissingColorSelection(_) => "missing_color_selection",
        }
    }
}
