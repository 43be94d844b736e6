//! Inbound frames, outbound events, and the envelope around them.
//!
//! Inbound traffic is deliberately loose: a [`ClientFrame`] names an event
//! and carries an untyped JSON `data` object. The server's dispatch table
//! routes on the name and each handler decodes its own request type with
//! [`decode_request`]. Outbound traffic is a closed, typed [`ServerEvent`]
//! enum wrapped in an [`Envelope`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Card, CardId, Color, PlayerId, ProtocolError, RoomCode};

/// Inbound event names.
pub mod names {
    pub const ROOMS_LIST: &str = "rooms:list";
    pub const ROOM_CREATE: &str = "room:create";
    pub const ROOM_JOIN: &str = "room:join";
    pub const ROOM_LEAVE: &str = "room:leave";
    pub const ROOM_READY: &str = "room:ready";
    pub const GAME_START: &str = "game:start";
    pub const GAME_DRAW: &str = "game:draw";
    pub const GAME_PLAY: &str = "game:play";
    pub const PING: &str = "ping";

    /// Older event names still sent by existing clients. Each routes to the
    /// same handler as its current counterpart.
    pub mod legacy {
        pub const CREATE_GAME: &str = "CreateGame";
        pub const JOIN_GAME: &str = "JoinGame";
        pub const TOGGLE_READY: &str = "ToggleReady";
        pub const LEAVE_GAME: &str = "LeaveGame";
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// One frame sent by a client.
///
/// ```json
/// { "seq": 4, "event": "game:play", "data": { "cardId": 31, "selectedColor": "blue" } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientFrame {
    /// Client-side counter, echoed in logs only.
    #[serde(default)]
    pub seq: u64,
    /// Event name, see [`names`].
    pub event: String,
    /// Event payload. Missing or `null` means "no arguments".
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Decodes a handler's request type from a frame's `data`.
///
/// A missing payload decodes as `T::default()`, so events whose fields are
/// all optional accept a bare `{"event": "..."}` frame.
pub fn decode_request<T>(data: serde_json::Value) -> Result<T, ProtocolError>
where
    T: DeserializeOwned + Default,
{
    if data.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(data).map_err(ProtocolError::Decode)
}

/// Reads a field that should be a string. Any other JSON value reads as
/// absent, so the caller falls back to its default instead of failing the
/// whole request.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/// Payload of `room:create` (legacy `CreateGame`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRoomRequest {
    #[serde(alias = "playerName", deserialize_with = "lenient_string")]
    pub display_name: Option<String>,
}

/// Payload of `room:join` (legacy `JoinGame`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JoinRoomRequest {
    #[serde(alias = "gameId", deserialize_with = "lenient_string")]
    pub room_id: Option<String>,
    #[serde(alias = "playerName", deserialize_with = "lenient_string")]
    pub display_name: Option<String>,
}

/// Payload of `game:play`.
///
/// `selected_color` stays a raw string here: an unknown color is a
/// missing color selection, not a malformed frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayCardRequest {
    pub card_id: Option<CardId>,
    pub selected_color: Option<String>,
}

impl PlayCardRequest {
    /// The requested color, if it names one of the four colors.
    pub fn color(&self) -> Option<Color> {
        self.selected_color.as_deref().and_then(|s| s.parse().ok())
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Final result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub winner_id: PlayerId,
    /// Points awarded to the winner.
    pub points: u32,
}

/// The per-recipient snapshot of a room.
///
/// Contains the recipient's own hand in full but only the *size* of the
/// opponent's hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub room_id: RoomCode,
    pub me_id: PlayerId,
    pub me_name: String,
    pub opponent_name: Option<String>,
    pub me_ready: bool,
    pub opponent_ready: Option<bool>,
    pub started: bool,
    pub your_hand: Vec<Card>,
    pub opponent_count: usize,
    pub deck_count: usize,
    pub top_card: Option<Card>,
    pub turn_id: Option<PlayerId>,
    pub active_color: Color,
    pub pending_draw: u32,
    pub skip_next: bool,
    pub over: Option<Outcome>,
}

/// A public room listing entry. Never carries hand or pile contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: RoomCode,
    pub players_count: usize,
    pub started: bool,
    pub over: bool,
    /// Unix timestamp in milliseconds.
    pub created_at: u64,
}

/// Win or loss, from one participant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchResult {
    Win,
    Loss,
}

/// Response to `room:create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl CreateResult {
    pub fn created(room_id: RoomCode) -> Self {
        Self { ok: true, room_id: Some(room_id), error: None }
    }

    pub fn failed(error: ErrorBody) -> Self {
        Self { ok: false, room_id: None, error: Some(error) }
    }
}

/// Response to `room:join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResult {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_id: Option<RoomCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub me_id: Option<PlayerId>,
    #[serde(default)]
    pub started: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl JoinResult {
    pub fn joined(room_id: RoomCode, me_id: PlayerId, started: bool) -> Self {
        Self {
            ok: true,
            room_id: Some(room_id),
            me_id: Some(me_id),
            started,
            error: None,
        }
    }

    pub fn failed(error: ErrorBody) -> Self {
        Self { ok: false, room_id: None, me_id: None, started: false, error: Some(error) }
    }
}

/// A machine-readable error code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Everything the server can send.
///
/// Adjacently tagged, so each event reads `{ "event": "...", "data": ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// The recipient's filtered view of their room.
    #[serde(rename = "state:update")]
    StateUpdate(PlayerView),

    /// Pushed listing, sent to every connection on roster changes.
    #[serde(rename = "rooms:update")]
    RoomsUpdate { rooms: Vec<RoomSummary> },

    /// Listing in reply to `rooms:list`.
    #[serde(rename = "rooms:list:result")]
    RoomsListResult { rooms: Vec<RoomSummary> },

    #[serde(rename = "room:create:result")]
    CreateResult(CreateResult),

    #[serde(rename = "room:join:result")]
    JoinResult(JoinResult),

    #[serde(rename = "room:leave:result")]
    LeaveResult { ok: bool },

    /// A rejected action. Sent to the actor only.
    #[serde(rename = "game:error")]
    Error(ErrorBody),

    /// Game-end report for the embedding surface's point ledger.
    #[serde(rename = "game:end", rename_all = "camelCase")]
    GameEnd {
        outcome: MatchResult,
        points_earned: u32,
    },

    #[serde(rename = "pong")]
    Pong,
}

/// The top-level outbound wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Per-connection counter, starting at 1.
    pub seq: u64,
    /// Milliseconds since the connection was accepted.
    pub timestamp: u64,
    pub payload: ServerEvent,
}
