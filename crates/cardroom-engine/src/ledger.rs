//! The boundary to an external point ledger.
//!
//! The server holds no ledger. When a game ends it tells each participant
//! how they did, and whatever embeds the client feeds that report through
//! [`ledger_update`] to learn what to persist.

use cardroom_protocol::{MatchResult, Outcome, PlayerId};
use serde::{Deserialize, Serialize};

/// One participant's view of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEndReport {
    pub outcome: MatchResult,
    pub points_earned: u32,
}

/// What a ledger should add to a profile for one finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerUpdate {
    pub points_delta: u32,
    pub wins_delta: u32,
    pub losses_delta: u32,
}

/// Translates a game-end report into a ledger delta.
///
/// Only wins earn points; a loss reports zero whatever figure it carries.
pub fn ledger_update(outcome: MatchResult, points_earned: u32) -> LedgerUpdate {
    match outcome {
        MatchResult::Win => LedgerUpdate {
            points_delta: points_earned,
            wins_delta: 1,
            losses_delta: 0,
        },
        MatchResult::Loss => LedgerUpdate {
            points_delta: 0,
            wins_delta: 0,
            losses_delta: 1,
        },
    }
}

/// Builds the report `player` receives for `outcome`.
pub fn report_for(outcome: &Outcome, player: PlayerId) -> GameEndReport {
    if outcome.winner_id == player {
        GameEndReport { outcome: MatchResult::Win, points_earned: outcome.points }
    } else {
        GameEndReport { outcome: MatchResult::Loss, points_earned: 0 }
    }
}
