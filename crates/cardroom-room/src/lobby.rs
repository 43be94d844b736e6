//! Lifecycle and presence: creating, joining, readying, starting and
//! leaving rooms, plus routing draws and plays to the right table.
//!
//! Every operation either fully applies or returns an error and leaves
//! the registry untouched.

use cardroom_engine::{Draw, Play};
use cardroom_protocol::{CardId, Color, PlayerId, RoomCode, RoomSummary};
use rand::Rng;

use crate::names::{sanitize_code, sanitize_name};
use crate::room::Participant;
use crate::{Room, RoomConfig, RoomError, RoomRegistry};

/// What happened to a room when someone left it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// The room emptied and was removed from the registry.
    Deleted,
    /// Someone is still seated. The room went back to its pre-start
    /// state.
    Reset,
}

/// Result of a successful create or join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joined {
    pub code: RoomCode,
    pub started: bool,
    /// The room the player was moved out of, if they were seated
    /// elsewhere.
    pub left: Option<(RoomCode, Departure)>,
}

/// Result of a ready toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyToggle {
    /// The caller's new ready flag.
    pub ready: bool,
    /// `true` if the toggle completed a ready-up and a game was dealt.
    pub dealt: bool,
}

/// Front door to the registry for everything a player can do.
#[derive(Debug)]
pub struct Lobby {
    registry: RoomRegistry,
}

impl Lobby {
    pub fn new(config: RoomConfig) -> Self {
        Self { registry: RoomRegistry::new(config) }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RoomConfig {
        self.registry.config()
    }

    pub fn room(&self, code: &RoomCode) -> Option<&Room> {
        self.registry.get(code)
    }

    /// Public listing, newest first.
    pub fn list(&self) -> Vec<RoomSummary> {
        self.registry.list()
    }

    /// Creates a room under a fresh code and seats the creator in it.
    ///
    /// `current` is the room the player is seated in now, if any; they
    /// leave it first.
    ///
    /// # Errors
    /// [`RoomError::RegistryExhausted`] if no free code could be found.
    pub fn create_room<R: Rng + ?Sized>(
        &mut self,
        player: PlayerId,
        current: Option<&RoomCode>,
        display_name: Option<&str>,
        rng: &mut R,
    ) -> Result<Joined, RoomError> {
        let code = self.registry.create(rng)?;
        self.join_room(player, current, Some(code.as_str()), display_name)
    }

    /// Seats `player` in the room named by `raw_code`, creating the room
    /// if it does not exist.
    ///
    /// Joining a room the player already sits in only updates their name.
    /// Joining a different room leaves `current` first.
    ///
    /// # Errors
    /// [`RoomError::InvalidInput`] for an unusable code,
    /// [`RoomError::RoomFull`] if two others are already seated.
    pub fn join_room(
        &mut self,
        player: PlayerId,
        current: Option<&RoomCode>,
        raw_code: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<Joined, RoomError> {
        let code = sanitize_code(raw_code)?;
        let name = sanitize_name(display_name, self.config());
        let max_players = self.config().max_players;

        if let Some(room) = self.registry.get(&code) {
            if !room.is_member(player) && room.participants().len() >= max_players {
                return Err(RoomError::RoomFull(code));
            }
        }

        let left = match current {
            Some(old) if *old != code => {
                self.leave(old, player).ok().map(|departure| (old.clone(), departure))
            }
            _ => None,
        };

        let room = self.registry.open(&code);
        match room.participant_mut(player) {
            Some(participant) => participant.name = name,
            None => {
                tracing::info!(room = %code, %player, %name, "player joined");
                room.seat(Participant { id: player, name, ready: false });
            }
        }

        Ok(Joined { code, started: room.started(), left })
    }

    /// Flips the caller's ready flag. Deals a new game when both
    /// participants are ready and no game is being played.
    pub fn toggle_ready<R: Rng + ?Sized>(
        &mut self,
        code: &RoomCode,
        player: PlayerId,
        rng: &mut R,
    ) -> Result<ReadyToggle, RoomError> {
        let config = self.config().clone();
        let room = self.seated(code, player)?;

        let ready = match room.participant_mut(player) {
            Some(participant) => {
                participant.ready = !participant.ready;
                participant.ready
            }
            None => return Err(RoomError::NotInRoom(player)),
        };

        let dealt = room.participants().len() >= config.max_players
            && room.all_ready()
            && room.phase().can_deal();
        if dealt {
            deal(room, config.hand_size, rng);
        }

        Ok(ReadyToggle { ready, dealt })
    }

    /// Deals immediately, marking everyone ready. Works mid-game and after
    /// a finished game alike.
    ///
    /// # Errors
    /// [`RoomError::NoOpponent`] if the caller is alone.
    pub fn force_start<R: Rng + ?Sized>(
        &mut self,
        code: &RoomCode,
        player: PlayerId,
        rng: &mut R,
    ) -> Result<(), RoomError> {
        let hand_size = self.config().hand_size;
        let room = self.seated(code, player)?;
        if room.seats().is_none() {
            return Err(RoomError::NoOpponent);
        }
        room.set_all_ready(true);
        deal(room, hand_size, rng);
        Ok(())
    }

    /// Removes `player` from the room. An emptied room is deleted; any
    /// other room is reset.
    pub fn leave(&mut self, code: &RoomCode, player: PlayerId) -> Result<Departure, RoomError> {
        let room = self.seated(code, player)?;
        room.unseat(player);
        tracing::info!(room = %code, %player, "player left");

        if room.is_empty() {
            self.registry.delete(code);
            return Ok(Departure::Deleted);
        }
        room.reset();
        Ok(Departure::Reset)
    }

    /// Draws a card for the caller.
    pub fn draw<R: Rng + ?Sized>(
        &mut self,
        code: &RoomCode,
        player: PlayerId,
        rng: &mut R,
    ) -> Result<Draw, RoomError> {
        let room = self.seated(code, player)?;
        Ok(room.table_mut().draw(player, rng)?)
    }

    /// Plays a card for the caller. A winning play clears both ready
    /// flags, so a rematch needs a fresh ready-up or a forced start.
    ///
    /// # Errors
    /// [`RoomError::InvalidInput`] if no card was named, otherwise
    /// whatever the engine rejects the play with.
    pub fn play<R: Rng + ?Sized>(
        &mut self,
        code: &RoomCode,
        player: PlayerId,
        card_id: Option<CardId>,
        selected: Option<Color>,
        rng: &mut R,
    ) -> Result<Play, RoomError> {
        let room = self.seated(code, player)?;
        let card_id = card_id.ok_or_else(|| RoomError::InvalidInput("missing cardId".into()))?;

        let play = room.table_mut().play(player, card_id, selected, rng)?;
        if let Play::Won(outcome) = play {
            room.set_all_ready(false);
            tracing::info!(
                room = %code,
                winner = %outcome.winner_id,
                points = outcome.points,
                "game finished"
            );
        }
        Ok(play)
    }

    fn seated(&mut self, code: &RoomCode, player: PlayerId) -> Result<&mut Room, RoomError> {
        let room = self
            .registry
            .get_mut(code)
            .ok_or_else(|| RoomError::RoomNotFound(code.clone()))?;
        if !room.is_member(player) {
            return Err(RoomError::NotInRoom(player));
        }
        Ok(room)
    }
}

fn deal<R: Rng + ?Sized>(room: &mut Room, hand_size: usize, rng: &mut R) {
    let Some(seats) = room.seats() else { return };
    room.table_mut().deal(seats, hand_size, rng);
    room.set_started(true);
    tracing::info!(room = %room.code(), first = %seats[0], "game dealt");
}
