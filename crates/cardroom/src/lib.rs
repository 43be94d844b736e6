//! # Cardroom
//!
//! Real-time two-player card game server over WebSockets.
//!
//! Players connect, create or join a room by code, ready up, and play a
//! shedding game against each other. The server is authoritative: clients
//! send intents, a single dispatcher task applies them in arrival order and
//! pushes each participant their own filtered view of the room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cardroom::prelude::*;
//!
//! # async fn start() -> Result<(), CardroomError> {
//! let server = CardroomServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod dispatch;
mod error;
mod handler;
mod publish;
mod server;

pub use error::CardroomError;
pub use server::{CardroomServer, CardroomServerBuilder};

/// Convenience re-exports for embedding the server and talking to it.
pub mod prelude {
    pub use crate::error::CardroomError;
    pub use crate::server::{CardroomServer, CardroomServerBuilder};

    pub use cardroom_engine::{LedgerUpdate, ledger_update};
    pub use cardroom_protocol::{
        Card, CardId, ClientFrame, Codec, Color, Envelope, ErrorBody, JsonCodec, MatchResult,
        PlayerId, PlayerView, Rank, RoomCode, RoomSummary, ServerEvent, names,
    };
    pub use cardroom_room::RoomConfig;
}
