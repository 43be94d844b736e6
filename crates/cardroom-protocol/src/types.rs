//! Identity types shared by every layer.
//!
//! Both are newtypes: a `PlayerId` can never be passed where a `RoomCode`
//! is expected, and the wire representation stays a plain number / string
//! thanks to `#[serde(transparent)]` and `#[serde(try_from)]`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// Identity of a participant.
///
/// The server uses the transport connection id as the participant identity,
/// so a player id is only meaningful for the lifetime of one connection.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// A short, human-typeable room code such as `"K3ZQ9A"`.
///
/// Always non-empty, at most [`RoomCode::MAX_LEN`] characters, and made of
/// uppercase ASCII letters and digits. The only way to build one is
/// [`RoomCode::parse`], which sanitizes instead of rejecting wherever it can.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Longest code accepted from clients.
    pub const MAX_LEN: usize = 8;

    /// Normalizes raw user input into a room code.
    ///
    /// Surrounding whitespace and anything that is not an ASCII letter or
    /// digit is dropped, letters are uppercased, and the result is cut to
    /// [`Self::MAX_LEN`]. Returns `None` when nothing usable is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let code: String = raw
            .trim()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_uppercase())
            .take(Self::MAX_LEN)
            .collect();
        if code.is_empty() { None } else { Some(Self(code)) }
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or_else(|| {
            ProtocolError::InvalidMessage(format!("invalid room code {raw:?}"))
        })
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
