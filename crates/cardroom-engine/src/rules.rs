//! Pure rule functions: legality and scoring.

use cardroom_protocol::{Card, Color, Rank};

/// Returns `true` if `card` may be played onto `top` while `active` is the
/// color in force.
///
/// Wild ranks are always playable. Otherwise the card must match the
/// active color, or match the top card's rank. The top card's own color is
/// never consulted: after a wild, the chosen color is what binds.
pub fn is_playable(card: &Card, top: &Card, active: Color) -> bool {
    card.rank().is_wild() || card.color() == Some(active) || card.rank() == top.rank()
}

/// Points a card is worth when left in the loser's hand.
pub fn card_points(card: &Card) -> u32 {
    match card.rank() {
        Rank::Number(n) => u32::from(n),
        Rank::Skip | Rank::Reverse | Rank::DrawTwo => 20,
        Rank::Wild | Rank::WildDrawFour => 50,
    }
}

/// Sum of [`card_points`] over a hand.
pub fn hand_points(hand: &[Card]) -> u32 {
    hand.iter().map(card_points).sum()
}
