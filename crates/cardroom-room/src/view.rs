//! Projections of a room: the private per-player view and the public
//! listing entry.

use cardroom_protocol::{PlayerId, PlayerView, RoomSummary};

use crate::Room;

/// Builds what `viewer` is allowed to see of `room`.
///
/// The viewer's own hand is included in full. The opponent appears only as
/// a name, a ready flag and a card count.
pub fn project(room: &Room, viewer: PlayerId) -> PlayerView {
    let table = room.table();
    let me = room.participant(viewer);
    let opponent = room.opponent_of(viewer);

    PlayerView {
        room_id: room.code().clone(),
        me_id: viewer,
        me_name: me.map(|p| p.name.clone()).unwrap_or_default(),
        opponent_name: opponent.map(|p| p.name.clone()),
        me_ready: me.is_some_and(|p| p.ready),
        opponent_ready: opponent.map(|p| p.ready),
        started: room.started(),
        your_hand: table.hand(viewer).to_vec(),
        opponent_count: opponent.map_or(0, |p| table.hand(p.id).len()),
        deck_count: table.draw_pile_len(),
        top_card: table.top_card().copied(),
        turn_id: table.turn(),
        active_color: table.active_color(),
        pending_draw: table.pending_draw(),
        skip_next: table.skip_next(),
        over: table.outcome(),
    }
}

/// The public listing entry for `room`.
pub fn summary(room: &Room) -> RoomSummary {
    RoomSummary {
        room_id: room.code().clone(),
        players_count: room.participants().len(),
        started: room.started(),
        over: room.table().outcome().is_some(),
        created_at: room.created_at(),
    }
}
