//! Wire protocol for cardroom.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Identities** ([`PlayerId`], [`RoomCode`]) and the card model
//!   ([`Card`], [`CardId`], [`Rank`], [`Color`]).
//! - **Inbound frames** ([`ClientFrame`]) and the request payloads that
//!   handlers decode from them.
//! - **Outbound events** ([`ServerEvent`]) wrapped in an [`Envelope`],
//!   including the per-recipient [`PlayerView`] and the public
//!   [`RoomSummary`] listing.
//! - **Codec** ([`Codec`], [`JsonCodec`]) for turning all of the above
//!   into bytes.
//!
//! It knows nothing about sockets or rooms, only about shapes.

mod card;
mod codec;
mod error;
mod event;
mod types;

pub use card::{Card, CardId, Color, Rank};
pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use event::{
    ClientFrame, CreateResult, CreateRoomRequest, Envelope, ErrorBody, JoinResult,
    JoinRoomRequest, MatchResult, Outcome, PlayCardRequest, PlayerView, RoomSummary,
    ServerEvent, decode_request, names,
};
pub use types::{PlayerId, RoomCode};
