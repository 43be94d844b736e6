//! Room registry: storage and code uniqueness, nothing else.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use cardroom_protocol::{RoomCode, RoomSummary};
use rand::Rng;

use crate::{Room, RoomConfig, RoomError, view};

/// Characters used in generated room codes.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Owns every room in the process.
///
/// There is exactly one registry per server and it is owned by the
/// dispatcher, so no method here locks anything.
#[derive(Debug)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
    config: RoomConfig,
    /// Creation counter, used to order rooms created in the same
    /// millisecond.
    next_sequence: u64,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
            next_sequence: 0,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Creates an empty room under a freshly generated code.
    ///
    /// # Errors
    /// [`RoomError::RegistryExhausted`] if `code_attempts` generated codes
    /// all collide with existing rooms.
    pub fn create<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<RoomCode, RoomError> {
        let len = self.config.code_len;
        self.create_with(|| random_code(rng, len))
    }

    /// Like [`create`](Self::create), with codes drawn from `next_code`.
    pub fn create_with<F>(&mut self, mut next_code: F) -> Result<RoomCode, RoomError>
    where
        F: FnMut() -> Option<RoomCode>,
    {
        let attempts = self.config.code_attempts;
        for _ in 0..attempts {
            let Some(code) = next_code() else { continue };
            if !self.rooms.contains_key(&code) {
                self.open(&code);
                return Ok(code);
            }
        }
        tracing::warn!(attempts, "room code space exhausted");
        Err(RoomError::RegistryExhausted(attempts))
    }

    /// Returns the room for `code`, creating an empty one if needed.
    pub fn open(&mut self, code: &RoomCode) -> &mut Room {
        let next_sequence = &mut self.next_sequence;
        self.rooms.entry(code.clone()).or_insert_with(|| {
            let sequence = *next_sequence;
            *next_sequence += 1;
            tracing::info!(room = %code, "room created");
            Room::new(code.clone(), now_millis(), sequence)
        })
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    pub fn get_mut(&mut self, code: &RoomCode) -> Option<&mut Room> {
        self.rooms.get_mut(code)
    }

    /// Removes a room. Returns it if it existed.
    pub fn delete(&mut self, code: &RoomCode) -> Option<Room> {
        let removed = self.rooms.remove(code);
        if removed.is_some() {
            tracing::info!(room = %code, "room deleted");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Public listing, newest room first.
    pub fn list(&self) -> Vec<RoomSummary> {
        let mut rooms: Vec<&Room> = self.rooms.values().collect();
        rooms.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.sequence().cmp(&a.sequence()))
        });
        rooms.into_iter().map(view::summary).collect()
    }

}

/// Generates a random code of `len` characters from [`CODE_ALPHABET`].
pub fn random_code<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<RoomCode> {
    let code: String = (0..len)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect();
    RoomCode::parse(&code)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
