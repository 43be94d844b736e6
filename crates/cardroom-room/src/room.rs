//! A single room: who is seated, who is ready, and the table they share.

use cardroom_engine::Table;
use cardroom_protocol::{PlayerId, RoomCode};

use crate::RoomPhase;

/// One seated participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: PlayerId,
    pub name: String,
    pub ready: bool,
}

/// Authoritative state of one room.
///
/// Participants are kept in join order, which is also seat order when a
/// game is dealt.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    /// Unix milliseconds.
    created_at: u64,
    /// Tie-breaker for rooms created within the same millisecond.
    sequence: u64,
    participants: Vec<Participant>,
    started: bool,
    table: Table,
}

impl Room {
    pub(crate) fn new(code: RoomCode, created_at: u64, sequence: u64) -> Self {
        Self {
            code,
            created_at,
            sequence,
            participants: Vec::new(),
            started: false,
            table: Table::new(),
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub(crate) fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Participants in join order.
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, player: PlayerId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == player)
    }

    pub(crate) fn participant_mut(&mut self, player: PlayerId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == player)
    }

    /// The other participant, if one is seated.
    pub fn opponent_of(&self, player: PlayerId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id != player)
    }

    pub fn is_member(&self, player: PlayerId) -> bool {
        self.participant(player).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// `true` once a game has been dealt, until someone leaves.
    pub fn started(&self) -> bool {
        self.started
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub(crate) fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    pub fn phase(&self) -> RoomPhase {
        if self.started {
            if self.table.outcome().is_some() {
                return RoomPhase::Finished;
            }
            return RoomPhase::InProgress;
        }
        match self.participants.len() {
            0 => RoomPhase::Empty,
            1 => RoomPhase::Waiting,
            _ => RoomPhase::Full,
        }
    }

    /// The first two participants, in seat order.
    pub(crate) fn seats(&self) -> Option<[PlayerId; 2]> {
        match self.participants.as_slice() {
            [a, b, ..] => Some([a.id, b.id]),
            _ => None,
        }
    }

    pub(crate) fn seat(&mut self, participant: Participant) {
        self.participants.push(participant);
    }

    /// Removes `player`. Returns `false` if they were not seated.
    pub(crate) fn unseat(&mut self, player: PlayerId) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.id != player);
        self.participants.len() != before
    }

    pub(crate) fn set_started(&mut self, started: bool) {
        self.started = started;
    }

    pub(crate) fn set_all_ready(&mut self, ready: bool) {
        for participant in &mut self.participants {
            participant.ready = ready;
        }
    }

    pub(crate) fn all_ready(&self) -> bool {
        !self.participants.is_empty() && self.participants.iter().all(|p| p.ready)
    }

    /// Back to the pre-start state: table cleared, nobody ready.
    pub(crate) fn reset(&mut self) {
        self.started = false;
        self.table.reset();
        self.set_all_ready(false);
    }
}
