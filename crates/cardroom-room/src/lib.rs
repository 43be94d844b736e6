//! Rooms for cardroom.
//!
//! A room seats up to two participants around one engine [`Table`]. This
//! crate owns every room in the process and everything that can happen to
//! one short of network I/O.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: stores rooms, generates unique codes, lists them
//! - [`Lobby`]: create / join / ready / start / leave, draws and plays
//! - [`Room`]: participants, ready flags and the table
//! - [`view::project`]: the per-player filtered snapshot
//! - [`RoomConfig`], [`RoomPhase`]: limits and the lifecycle state machine
//!
//! [`Table`]: cardroom_engine::Table

mod config;
mod error;
mod lobby;
pub mod names;
mod registry;
mod room;
pub mod view;

pub use config::{RoomConfig, RoomPhase};
pub use error::RoomError;
pub use lobby::{Departure, Joined, Lobby, ReadyToggle};
pub use registry::{RoomRegistry, random_code};
pub use room::{Participant, Room};
