//! Connection gateway for cardroom.
//!
//! Sits between the per-connection tasks and the dispatcher:
//!
//! ```text
//! Dispatcher (above)  ← decides what to send and to whom
//!     ↕
//! Gateway (this crate)  ← connection → outbox, connection ↔ room
//!     ↕
//! Writer tasks (below)  ← drain each outbox onto its socket
//! ```
//!
//! The gateway is generic over the message type: the server stores
//! `ServerEvent`s, the tests here store plain strings.

mod error;
mod gateway;

pub use error::GatewayError;
pub use gateway::{Gateway, Outbox};
