//! The gateway: who is connected, which room each connection is in, and
//! how to reach them.
//!
//! # Concurrency note
//!
//! `Gateway` is plain data. It is owned by the dispatcher task and never
//! shared, so none of its maps are locked. Delivery goes through unbounded
//! channels drained by one writer task per connection; a send here never
//! waits on a socket.

use std::collections::{BTreeSet, HashMap};

use cardroom_protocol::{PlayerId, RoomCode};
use tokio::sync::mpsc;

use crate::GatewayError;

/// Channel feeding one connection's writer task.
pub type Outbox<M> = mpsc::UnboundedSender<M>;

/// Tracks every live connection and the room it belongs to.
///
/// A connection is in at most one room at a time; joining a second room
/// moves it.
#[derive(Debug)]
pub struct Gateway<M> {
    outboxes: HashMap<PlayerId, Outbox<M>>,
    rooms: HashMap<PlayerId, RoomCode>,
    /// Reverse index of `rooms`, kept in sync with it.
    members: HashMap<RoomCode, BTreeSet<PlayerId>>,
}

impl<M> Default for Gateway<M> {
    fn default() -> Self {
        Self {
            outboxes: HashMap::new(),
            rooms: HashMap::new(),
            members: HashMap::new(),
        }
    }
}

impl<M: Clone> Gateway<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection.
    ///
    /// # Errors
    /// [`GatewayError::AlreadyRegistered`] if the identity is taken.
    pub fn register(&mut self, player: PlayerId, outbox: Outbox<M>) -> Result<(), GatewayError> {
        if self.outboxes.contains_key(&player) {
            return Err(GatewayError::AlreadyRegistered(player));
        }
        self.outboxes.insert(player, outbox);
        tracing::debug!(%player, connections = self.outboxes.len(), "connection registered");
        Ok(())
    }

    /// Forgets a connection. Returns the room it was in, if any.
    pub fn unregister(&mut self, player: PlayerId) -> Option<RoomCode> {
        self.outboxes.remove(&player);
        let room = self.detach(player);
        tracing::debug!(%player, connections = self.outboxes.len(), "connection unregistered");
        room
    }

    /// Puts a connection in `room`, moving it out of any other room.
    ///
    /// Returns the room it was moved out of.
    ///
    /// # Errors
    /// [`GatewayError::NotRegistered`] for an unknown connection.
    pub fn join(&mut self, player: PlayerId, room: &RoomCode) -> Result<Option<RoomCode>, GatewayError> {
        if !self.outboxes.contains_key(&player) {
            return Err(GatewayError::NotRegistered(player));
        }
        if self.rooms.get(&player) == Some(room) {
            return Ok(None);
        }
        let previous = self.detach(player);
        self.rooms.insert(player, room.clone());
        self.members.entry(room.clone()).or_default().insert(player);
        Ok(previous)
    }

    /// Takes a connection out of `room`. Returns `false` if it was not in
    /// that room.
    pub fn leave(&mut self, player: PlayerId, room: &RoomCode) -> bool {
        if self.rooms.get(&player) != Some(room) {
            return false;
        }
        self.detach(player).is_some()
    }

    pub fn room_of(&self, player: PlayerId) -> Option<&RoomCode> {
        self.rooms.get(&player)
    }

    /// Connections in `room`, in ascending identity order.
    pub fn members(&self, room: &RoomCode) -> Vec<PlayerId> {
        self.members
            .get(room)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn is_connected(&self, player: PlayerId) -> bool {
        self.outboxes.contains_key(&player)
    }

    pub fn connection_count(&self) -> usize {
        self.outboxes.len()
    }

    /// Queues `msg` for one connection. Returns `false` if the connection
    /// is gone; that is not an error.
    pub fn send_to(&self, player: PlayerId, msg: M) -> bool {
        let Some(outbox) = self.outboxes.get(&player) else {
            tracing::debug!(%player, "send to unknown connection dropped");
            return false;
        };
        if outbox.send(msg).is_err() {
            tracing::debug!(%player, "send to closed connection dropped");
            return false;
        }
        true
    }

    /// Sends each member of `room` its own message.
    ///
    /// `build` is called once per member; returning `None` skips that
    /// member. Returns how many messages were queued.
    pub fn broadcast_to_room<F>(&self, room: &RoomCode, mut build: F) -> usize
    where
        F: FnMut(PlayerId) -> Option<M>,
    {
        self.members(room)
            .into_iter()
            .filter_map(|player| build(player).map(|msg| (player, msg)))
            .filter(|(player, msg)| self.send_to(*player, msg.clone()))
            .count()
    }

    /// Sends the same message to every connection.
    pub fn broadcast_to_all(&self, msg: &M) -> usize {
        self.outboxes
            .keys()
            .filter(|player| self.send_to(**player, msg.clone()))
            .count()
    }

    fn detach(&mut self, player: PlayerId) -> Option<RoomCode> {
        let room = self.rooms.remove(&player)?;
        if let Some(set) = self.members.get_mut(&room) {
            set.remove(&player);
            if set.is_empty() {
                self.members.remove(&room);
            }
        }
        Some(room)
    }
}
