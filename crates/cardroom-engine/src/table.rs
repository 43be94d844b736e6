//! The authoritative state of one game: piles, hands, turn and pending
//! effects.
//!
//! A [`Table`] is plain data plus the transitions that the rules allow.
//! It performs no I/O and takes its randomness from the caller, so a
//! seeded RNG replays a game exactly.

use std::collections::{HashMap, VecDeque};

use cardroom_protocol::{Card, CardId, Color, Outcome, PlayerId, Rank};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::deck::{self, CardIds};
use crate::rules::{hand_points, is_playable};
use crate::GameError;

/// Upper bound on the number of cards examined when seeding the discard
/// pile.
const SEED_SCAN_LIMIT: usize = 500;

/// Result of [`Table::draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Draw {
    /// The drawn card can be played right away. The drawer keeps the turn.
    Playable(Card),
    /// The drawn card cannot be played. The turn has passed.
    Unplayable(Card),
    /// Both piles were exhausted. The turn has passed.
    Nothing,
}

/// Result of [`Table::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Play {
    /// The card was accepted and the game goes on.
    Continued,
    /// The card emptied the player's hand.
    Won(Outcome),
}

#[derive(Debug)]
pub struct Table {
    seats: Option<[PlayerId; 2]>,
    /// Front is the next card drawn.
    draw_pile: VecDeque<Card>,
    /// Last element is the active card.
    discard: Vec<Card>,
    hands: HashMap<PlayerId, Vec<Card>>,
    turn: Option<PlayerId>,
    active_color: Color,
    pending_draw: u32,
    skip_next: bool,
    outcome: Option<Outcome>,
    ids: CardIds,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            seats: None,
            draw_pile: VecDeque::new(),
            discard: Vec::new(),
            hands: HashMap::new(),
            turn: None,
            active_color: Color::Red,
            pending_draw: 0,
            skip_next: false,
            outcome: None,
            ids: CardIds::default(),
        }
    }
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Deals a fresh game between `seats`, in seat order.
    ///
    /// Any previous game, including its outcome, is discarded. The first
    /// seat moves first.
    pub fn deal<R: Rng + ?Sized>(
        &mut self,
        seats: [PlayerId; 2],
        hand_size: usize,
        rng: &mut R,
    ) {
        self.reset();

        let mut cards = deck::shuffled(&mut self.ids, rng).into_iter();
        for seat in seats {
            let hand: Vec<Card> = cards.by_ref().take(hand_size).collect();
            self.hands.insert(seat, hand);
        }
        self.draw_pile = cards.collect();

        let seed = self.seed_card();
        self.active_color = seed.and_then(|card| card.color()).unwrap_or(Color::Red);
        self.discard.extend(seed);
        self.seats = Some(seats);
        self.turn = Some(seats[0]);

        tracing::debug!(
            first = %seats[0],
            second = %seats[1],
            color = %self.active_color,
            "table dealt"
        );
    }

    /// Clears everything except the card id counter.
    pub fn reset(&mut self) {
        let ids = std::mem::take(&mut self.ids);
        *self = Self { ids, ..Self::default() };
    }

    /// Draws one card for `player`.
    ///
    /// # Errors
    /// [`GameError::GameNotRunning`] or [`GameError::NotYourTurn`].
    pub fn draw<R: Rng + ?Sized>(
        &mut self,
        player: PlayerId,
        rng: &mut R,
    ) -> Result<Draw, GameError> {
        let top = self.check_turn(player)?;

        let drawn = self.take(1, rng).pop();
        let result = match drawn {
            Some(card) => {
                self.hands.entry(player).or_default().push(card);
                if is_playable(&card, &top, self.active_color) {
                    return Ok(Draw::Playable(card));
                }
                Draw::Unplayable(card)
            }
            None => Draw::Nothing,
        };

        self.pass_turn();
        self.pump_turn(rng);
        Ok(result)
    }

    /// Plays `card_id` from `player`'s hand.
    ///
    /// `selected` names the new active color and is required for wild
    /// ranks; it is ignored for every other rank.
    ///
    /// # Errors
    /// Checked in order: [`GameError::GameNotRunning`],
    /// [`GameError::NotYourTurn`], [`GameError::CardNotInHand`],
    /// [`GameError::IllegalMove`], [`GameError::MissingColorSelection`].
    pub fn play<R: Rng + ?Sized>(
        &mut self,
        player: PlayerId,
        card_id: CardId,
        selected: Option<Color>,
        rng: &mut R,
    ) -> Result<Play, GameError> {
        let top = self.check_turn(player)?;

        let hand = self.hands.entry(player).or_default();
        let index = hand
            .iter()
            .position(|card| card.id() == card_id)
            .ok_or(GameError::CardNotInHand(card_id))?;
        let card = hand[index];

        if !is_playable(&card, &top, self.active_color) {
            return Err(GameError::IllegalMove(card_id));
        }
        let color = match card.color() {
            Some(color) => color,
            None => selected.ok_or(GameError::MissingColorSelection(card_id))?,
        };

        hand.remove(index);
        let emptied = hand.is_empty();
        self.discard.push(card);
        self.active_color = color;

        match card.rank() {
            Rank::Skip | Rank::Reverse => self.skip_next = true,
            Rank::DrawTwo => self.pending_draw = 2,
            Rank::WildDrawFour => self.pending_draw = 4,
            Rank::Number(_) | Rank::Wild => {}
        }

        if emptied {
            let loser_points = self
                .opponent_of(player)
                .and_then(|opponent| self.hands.get(&opponent))
                .map_or(0, |hand| hand_points(hand));
            let outcome = Outcome { winner_id: player, points: loser_points };
            self.outcome = Some(outcome);
            return Ok(Play::Won(outcome));
        }

        self.pass_turn();
        self.pump_turn(rng);
        Ok(Play::Continued)
    }

    /// Resolves queued effects until none is left, returning how many
    /// fired.
    pub fn pump_turn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let mut fired = 0;
        while self.apply_pending(rng) {
            fired += 1;
        }
        fired
    }

    /// Resolves one queued effect against the player about to move.
    ///
    /// A queued skip is consumed first. Otherwise a pending draw is dealt
    /// in full. Either way the turn passes. Returns `false` when nothing
    /// was queued or the game is over.
    pub fn apply_pending<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.outcome.is_some() {
            return false;
        }

        if self.skip_next {
            self.skip_next = false;
            self.pass_turn();
            return true;
        }

        if self.pending_draw > 0 {
            let count = std::mem::take(&mut self.pending_draw) as usize;
            let drawn = self.take(count, rng);
            if let Some(victim) = self.turn {
                self.hands.entry(victim).or_default().extend(drawn);
            }
            self.pass_turn();
            return true;
        }

        false
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// `true` between a deal and the winning play.
    pub fn is_running(&self) -> bool {
        self.seats.is_some() && self.outcome.is_none()
    }

    pub fn seats(&self) -> Option<[PlayerId; 2]> {
        self.seats
    }

    pub fn hand(&self, player: PlayerId) -> &[Card] {
        self.hands.get(&player).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn draw_pile_len(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn discard_len(&self) -> usize {
        self.discard.len()
    }

    pub fn top_card(&self) -> Option<&Card> {
        self.discard.last()
    }

    pub fn turn(&self) -> Option<PlayerId> {
        self.turn
    }

    pub fn active_color(&self) -> Color {
        self.active_color
    }

    pub fn pending_draw(&self) -> u32 {
        self.pending_draw
    }

    pub fn skip_next(&self) -> bool {
        self.skip_next
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Every card on the table: draw pile, discard pile, then hands.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.draw_pile
            .iter()
            .chain(&self.discard)
            .chain(self.hands.values().flatten())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Validates that `player` may act and returns the current top card.
    fn check_turn(&self, player: PlayerId) -> Result<Card, GameError> {
        if !self.is_running() {
            return Err(GameError::GameNotRunning);
        }
        if self.turn != Some(player) {
            return Err(GameError::NotYourTurn(player));
        }
        self.discard.last().copied().ok_or(GameError::GameNotRunning)
    }

    fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        let [a, b] = self.seats?;
        if a == player { Some(b) } else { Some(a) }
    }

    fn pass_turn(&mut self) {
        self.turn = self.turn.and_then(|current| self.opponent_of(current));
    }

    /// Takes up to `count` cards from the front of the draw pile,
    /// recycling the discard pile first if the draw pile is empty.
    fn take<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Vec<Card> {
        self.recycle(rng);
        let count = count.min(self.draw_pile.len());
        self.draw_pile.drain(..count).collect()
    }

    /// Shuffles every discard but the top back into an empty draw pile.
    fn recycle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if !self.draw_pile.is_empty() || self.discard.len() <= 1 {
            return;
        }
        let split = self.discard.len() - 1;
        let mut recycled: Vec<Card> = self.discard.drain(..split).collect();
        recycled.shuffle(rng);
        tracing::debug!(cards = recycled.len(), "discard pile recycled");
        self.draw_pile = recycled.into();
    }

    /// Rotates the draw pile until a colored numeral reaches the front,
    /// then removes it.
    fn seed_card(&mut self) -> Option<Card> {
        for _ in 0..SEED_SCAN_LIMIT {
            let Some(card) = self.draw_pile.pop_front() else {
                break;
            };
            if card.rank().is_number() && card.color().is_some() {
                return Some(card);
            }
            self.draw_pile.push_back(card);
        }
        Card::colored(self.ids.next(), Rank::Number(0), Color::Red)
    }
}
