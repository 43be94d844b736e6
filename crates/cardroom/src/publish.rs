//! Fan-out of state after a mutation.
//!
//! Every participant gets their own projection of the room; nobody is ever
//! sent a view built for someone else.

use cardroom_engine::report_for;
use cardroom_protocol::{Outcome, RoomCode, ServerEvent};
use cardroom_room::view;

use crate::dispatch::Dispatcher;

impl Dispatcher {
    /// Sends each member of `code` their filtered view. A room that no
    /// longer exists is skipped.
    pub(crate) fn publish_room(&self, code: &RoomCode) {
        let Some(room) = self.lobby.room(code) else {
            return;
        };
        let sent = self.gateway.broadcast_to_room(code, |player| {
            room.is_member(player)
                .then(|| ServerEvent::StateUpdate(view::project(room, player)))
        });
        tracing::trace!(room = %code, sent, "state published");
    }

    /// Pushes the public listing to every connection.
    pub(crate) fn publish_listing(&self) {
        let rooms = self.lobby.list();
        let sent = self.gateway.broadcast_to_all(&ServerEvent::RoomsUpdate { rooms });
        tracing::trace!(sent, "listing published");
    }

    /// Tells each member of `code` how the finished game went for them.
    pub(crate) fn publish_game_end(&self, code: &RoomCode, outcome: &Outcome) {
        self.gateway.broadcast_to_room(code, |player| {
            let report = report_for(outcome, player);
            Some(ServerEvent::GameEnd {
                outcome: report.outcome,
                points_earned: report.points_earned,
            })
        });
    }
}
