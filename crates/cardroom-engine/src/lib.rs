//! Rules engine for cardroom.
//!
//! The engine owns no connections and no rooms. It knows how to build and
//! shuffle the 108-card deck, which plays are legal, how turns advance
//! through skips and draw penalties, and how a finished game is scored.
//!
//! # Key types
//!
//! - [`Table`]: one game's piles, hands, turn and pending effects
//! - [`is_playable`], [`card_points`]: pure rule functions
//! - [`ledger_update`]: maps a game-end report to a point-ledger delta
//! - [`GameError`]: why a draw or play was rejected

mod deck;
mod error;
pub mod ledger;
mod rules;
mod table;

pub use deck::DECK_SIZE;
pub use error::GameError;
pub use ledger::{GameEndReport, LedgerUpdate, ledger_update, report_for};
pub use rules::{card_points, hand_points, is_playable};
pub use table::{Draw, Play, Table};
