//! Deck construction.

use cardroom_protocol::{Card, CardId, Color, Rank};
use rand::Rng;
use rand::seq::SliceRandom;

/// Number of cards in a full deck.
pub const DECK_SIZE: usize = 108;

/// Hands out card ids. Never rewinds, so ids stay unique across deals.
#[derive(Debug, Default)]
pub(crate) struct CardIds {
    next: u64,
}

impl CardIds {
    pub(crate) fn next(&mut self) -> CardId {
        self.next += 1;
        CardId(self.next)
    }
}

/// Builds the 108-card deck in canonical order.
///
/// Per color: one 0, two each of 1-9, two each of skip, reverse and
/// draw-two. Then four wilds and four wild-draw-fours.
pub(crate) fn build(ids: &mut CardIds) -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);

    for color in Color::ALL {
        deck.extend(Card::colored(ids.next(), Rank::Number(0), color));
        for n in 1..=9 {
            for _ in 0..2 {
                deck.extend(Card::colored(ids.next(), Rank::Number(n), color));
            }
        }
        for _ in 0..2 {
            for rank in [Rank::Skip, Rank::Reverse, Rank::DrawTwo] {
                deck.extend(Card::colored(ids.next(), rank, color));
            }
        }
    }
    for rank in [Rank::Wild, Rank::WildDrawFour] {
        for _ in 0..4 {
            deck.extend(Card::wild(ids.next(), rank));
        }
    }

    deck
}

/// Builds a full deck and shuffles it.
pub(crate) fn shuffled<R: Rng + ?Sized>(ids: &mut CardIds, rng: &mut R) -> Vec<Card> {
    let mut deck = build(ids);
    deck.shuffle(rng);
    deck
}
