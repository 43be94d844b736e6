//! The dispatcher: a single task that owns every room, every connection's
//! outbox and the RNG, and applies inbound events one at a time.
//!
//! Connection tasks never touch room state. They forward [`Command`]s
//! over an mpsc channel and the dispatcher handles each to completion
//! (validate, mutate, publish) before reading the next. Two players racing
//! for the same turn are therefore ordered by arrival, and the loser is
//! rejected by the ordinary turn check.

use std::collections::HashMap;

use cardroom_engine::Play;
use cardroom_gateway::{Gateway, Outbox};
use cardroom_protocol::{
    ClientFrame, CreateResult, CreateRoomRequest, ErrorBody, JoinResult, JoinRoomRequest,
    PlayCardRequest, PlayerId, RoomCode, ServerEvent, decode_request, names,
};
use cardroom_room::{Departure, Joined, Lobby, RoomConfig, RoomError};
use rand::rngs::StdRng;
use tokio::sync::mpsc;

use crate::CardroomError;

/// Messages from connection tasks to the dispatcher.
#[derive(Debug)]
pub(crate) enum Command {
    /// A connection was accepted. Its writer task drains `outbox`.
    Connect {
        player: PlayerId,
        outbox: Outbox<ServerEvent>,
    },

    /// A decoded frame from a connection, in arrival order.
    Frame { player: PlayerId, frame: ClientFrame },

    /// The connection closed, errored or went idle.
    Disconnect { player: PlayerId },
}

/// Uniform handler signature: the dispatcher, the sender's current room
/// (if any), the sender, and the frame's raw `data`.
type Handler =
    fn(&mut Dispatcher, Option<RoomCode>, PlayerId, serde_json::Value) -> Result<(), CardroomError>;

/// Owns all mutable server state.
pub(crate) struct Dispatcher {
    pub(crate) lobby: Lobby,
    pub(crate) gateway: Gateway<ServerEvent>,
    pub(crate) rng: StdRng,
    handlers: HashMap<&'static str, Handler>,
}

impl Dispatcher {
    pub(crate) fn new(config: RoomConfig, rng: StdRng) -> Self {
        Self {
            lobby: Lobby::new(config),
            gateway: Gateway::new(),
            rng,
            handlers: handler_table(),
        }
    }

    /// Processes commands until every sender is dropped.
    pub(crate) async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        tracing::debug!(events = self.handlers.len(), "dispatcher started");
        while let Some(command) = commands.recv().await {
            self.handle(command);
        }
        tracing::debug!("dispatcher stopped");
    }

    pub(crate) fn handle(&mut self, command: Command) {
        match command {
            Command::Connect { player, outbox } => {
                if let Err(e) = self.gateway.register(player, outbox) {
                    tracing::warn!(%player, error = %e, "duplicate connection");
                }
            }
            Command::Frame { player, frame } => self.dispatch(player, frame),
            Command::Disconnect { player } => self.disconnect(player),
        }
    }

    /// Routes one frame through the handler table. Failures go back to the
    /// sender only.
    fn dispatch(&mut self, player: PlayerId, frame: ClientFrame) {
        let ClientFrame { seq, event, data } = frame;
        let room = self.gateway.room_of(player).cloned();

        let result = match self.handlers.get(event.as_str()).copied() {
            Some(handler) => handler(self, room, player, data),
            None => Err(CardroomError::UnknownEvent(event.clone())),
        };

        if let Err(e) = result {
            match e {
                CardroomError::UnknownEvent(_) => {
                    tracing::warn!(%player, seq, %event, "unknown event");
                }
                _ => tracing::debug!(%player, seq, %event, error = %e, "action rejected"),
            }
            self.gateway
                .send_to(player, ServerEvent::Error(ErrorBody::new(e.code(), e.to_string())));
        }
    }

    /// Funnels a dropped connection through the ordinary leave path.
    fn disconnect(&mut self, player: PlayerId) {
        if let Some(room) = self.gateway.room_of(player).cloned() {
            self.depart(player, &room);
        }
        self.gateway.unregister(player);
    }

    /// Removes `player` from `room` in both the lobby and the gateway, then
    /// tells whoever is left.
    fn depart(&mut self, player: PlayerId, room: &RoomCode) {
        self.gateway.leave(player, room);
        match self.lobby.leave(room, player) {
            Ok(departure) => self.after_departure(room, departure),
            Err(e) => tracing::debug!(%player, %room, error = %e, "leave ignored"),
        }
    }

    fn after_departure(&mut self, room: &RoomCode, departure: Departure) {
        if departure == Departure::Reset {
            self.publish_room(room);
        }
        self.publish_listing();
    }

    /// Mirrors a successful create or join into the gateway.
    fn seat(&mut self, player: PlayerId, joined: &Joined) -> Result<(), CardroomError> {
        if let Some((old, departure)) = &joined.left {
            self.gateway.leave(player, old);
            self.after_departure(old, *departure);
        }
        self.gateway.join(player, &joined.code)?;
        Ok(())
    }
}

fn handler_table() -> HashMap<&'static str, Handler> {
    let mut table: HashMap<&'static str, Handler> = HashMap::new();
    table.insert(names::ROOMS_LIST, rooms_list);
    table.insert(names::ROOM_CREATE, room_create);
    table.insert(names::ROOM_JOIN, room_join);
    table.insert(names::ROOM_LEAVE, room_leave);
    table.insert(names::ROOM_READY, room_ready);
    table.insert(names::GAME_START, game_start);
    table.insert(names::GAME_DRAW, game_draw);
    table.insert(names::GAME_PLAY, game_play);
    table.insert(names::PING, ping);

    table.insert(names::legacy::CREATE_GAME, room_create);
    table.insert(names::legacy::JOIN_GAME, room_join);
    table.insert(names::legacy::TOGGLE_READY, room_ready);
    table.insert(names::legacy::LEAVE_GAME, room_leave);
    table
}

fn require_room(room: Option<RoomCode>, player: PlayerId) -> Result<RoomCode, CardroomError> {
    room.ok_or(CardroomError::Room(RoomError::NotInRoom(player)))
}

fn error_body(e: impl Into<CardroomError>) -> ErrorBody {
    let e = e.into();
    ErrorBody::new(e.code(), e.to_string())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn rooms_list(
    d: &mut Dispatcher,
    _room: Option<RoomCode>,
    player: PlayerId,
    _data: serde_json::Value,
) -> Result<(), CardroomError> {
    let rooms = d.lobby.list();
    d.gateway.send_to(player, ServerEvent::RoomsListResult { rooms });
    Ok(())
}

fn room_create(
    d: &mut Dispatcher,
    room: Option<RoomCode>,
    player: PlayerId,
    data: serde_json::Value,
) -> Result<(), CardroomError> {
    let created = match decode_request::<CreateRoomRequest>(data) {
        Ok(req) => d
            .lobby
            .create_room(player, room.as_ref(), req.display_name.as_deref(), &mut d.rng)
            .map_err(CardroomError::from),
        Err(e) => Err(e.into()),
    };

    match created {
        Ok(joined) => {
            d.seat(player, &joined)?;
            d.gateway.send_to(
                player,
                ServerEvent::JoinResult(JoinResult::joined(joined.code.clone(), player, joined.started)),
            );
            d.publish_room(&joined.code);
            d.publish_listing();
            d.gateway
                .send_to(player, ServerEvent::CreateResult(CreateResult::created(joined.code)));
        }
        Err(e) => {
            tracing::debug!(%player, error = %e, "create failed");
            d.gateway
                .send_to(player, ServerEvent::CreateResult(CreateResult::failed(error_body(e))));
        }
    }
    Ok(())
}

fn room_join(
    d: &mut Dispatcher,
    room: Option<RoomCode>,
    player: PlayerId,
    data: serde_json::Value,
) -> Result<(), CardroomError> {
    let joined = match decode_request::<JoinRoomRequest>(data) {
        Ok(req) => d
            .lobby
            .join_room(player, room.as_ref(), req.room_id.as_deref(), req.display_name.as_deref())
            .map_err(CardroomError::from),
        Err(e) => Err(e.into()),
    };

    match joined {
        Ok(joined) => {
            d.seat(player, &joined)?;
            d.gateway.send_to(
                player,
                ServerEvent::JoinResult(JoinResult::joined(joined.code.clone(), player, joined.started)),
            );
            d.publish_room(&joined.code);
            d.publish_listing();
        }
        Err(e) => {
            tracing::debug!(%player, error = %e, "join failed");
            d.gateway
                .send_to(player, ServerEvent::JoinResult(JoinResult::failed(error_body(e))));
        }
    }
    Ok(())
}

fn room_leave(
    d: &mut Dispatcher,
    room: Option<RoomCode>,
    player: PlayerId,
    _data: serde_json::Value,
) -> Result<(), CardroomError> {
    if let Some(room) = room {
        d.depart(player, &room);
    }
    d.gateway.send_to(player, ServerEvent::LeaveResult { ok: true });
    Ok(())
}

fn room_ready(
    d: &mut Dispatcher,
    room: Option<RoomCode>,
    player: PlayerId,
    _data: serde_json::Value,
) -> Result<(), CardroomError> {
    let room = require_room(room, player)?;
    let toggle = d.lobby.toggle_ready(&room, player, &mut d.rng)?;
    d.publish_room(&room);
    if toggle.dealt {
        d.publish_listing();
    }
    Ok(())
}

fn game_start(
    d: &mut Dispatcher,
    room: Option<RoomCode>,
    player: PlayerId,
    _data: serde_json::Value,
) -> Result<(), CardroomError> {
    let room = require_room(room, player)?;
    d.lobby.force_start(&room, player, &mut d.rng)?;
    d.publish_room(&room);
    d.publish_listing();
    Ok(())
}

fn game_draw(
    d: &mut Dispatcher,
    room: Option<RoomCode>,
    player: PlayerId,
    _data: serde_json::Value,
) -> Result<(), CardroomError> {
    let room = require_room(room, player)?;
    d.lobby.draw(&room, player, &mut d.rng)?;
    d.publish_room(&room);
    Ok(())
}

fn game_play(
    d: &mut Dispatcher,
    room: Option<RoomCode>,
    player: PlayerId,
    data: serde_json::Value,
) -> Result<(), CardroomError> {
    let room = require_room(room, player)?;
    let req: PlayCardRequest = decode_request(data)?;
    let play = d
        .lobby
        .play(&room, player, req.card_id, req.color(), &mut d.rng)?;

    d.publish_room(&room);
    if let Play::Won(outcome) = play {
        d.publish_listing();
        d.publish_game_end(&room, &outcome);
    }
    Ok(())
}

fn ping(
    d: &mut Dispatcher,
    _room: Option<RoomCode>,
    player: PlayerId,
    _data: serde_json::Value,
) -> Result<(), CardroomError> {
    d.gateway.send_to(player, ServerEvent::Pong);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardroom_protocol::MatchResult;
    use rand::SeedableRng;
    use serde_json::json;

    const ANA: PlayerId = PlayerId(1);
    const BEN: PlayerId = PlayerId(2);

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(RoomConfig::default(), StdRng::seed_from_u64(3))
    }

    fn connect(d: &mut Dispatcher, player: PlayerId) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (outbox, rx) = mpsc::unbounded_channel();
        d.handle(Command::Connect { player, outbox });
        rx
    }

    fn send(d: &mut Dispatcher, player: PlayerId, event: &str, data: serde_json::Value) {
        let frame = ClientFrame { seq: 0, event: event.to_string(), data };
        d.handle(Command::Frame { player, frame });
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn errors(events: &[ServerEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|event| match event {
                ServerEvent::Error(body) => Some(body.code.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_handler_table_covers_every_inbound_event() {
        let table = handler_table();
        for event in [
            names::ROOMS_LIST,
            names::ROOM_CREATE,
            names::ROOM_JOIN,
            names::ROOM_LEAVE,
            names::ROOM_READY,
            names::GAME_START,
            names::GAME_DRAW,
            names::GAME_PLAY,
            names::PING,
            names::legacy::CREATE_GAME,
            names::legacy::JOIN_GAME,
            names::legacy::TOGGLE_READY,
            names::legacy::LEAVE_GAME,
        ] {
            assert!(table.contains_key(event), "{event} has no handler");
        }
        assert_eq!(table.len(), 13);
    }

    #[test]
    fn test_unknown_event_errors_sender_only() {
        let mut d = dispatcher();
        let mut ana = connect(&mut d, ANA);
        let mut ben = connect(&mut d, BEN);

        send(&mut d, ANA, "game:cheat", json!({}));
        assert_eq!(errors(&drain(&mut ana)), ["unknown_event"]);
        assert!(drain(&mut ben).is_empty());
    }

    #[test]
    fn test_room_scoped_event_without_room() {
        let mut d = dispatcher();
        let mut ana = connect(&mut d, ANA);
        send(&mut d, ANA, names::GAME_DRAW, serde_json::Value::Null);
        assert_eq!(errors(&drain(&mut ana)), ["room_not_found"]);
    }

    #[test]
    fn test_malformed_payload_is_invalid_input() {
        let mut d = dispatcher();
        let mut ana = connect(&mut d, ANA);

        send(&mut d, ANA, names::ROOM_JOIN, json!(5));
        assert_eq!(join_failure(drain(&mut ana)), "invalid_input");

        send(&mut d, ANA, names::ROOM_CREATE, json!("Ana"));
        match drain(&mut ana).as_slice() {
            [ServerEvent::CreateResult(result)] => {
                assert!(!result.ok);
                assert_eq!(result.error.as_ref().map(|e| e.code.as_str()), Some("invalid_input"));
            }
            other => panic!("expected one create result, got {other:?}"),
        }
        assert!(d.lobby.registry().is_empty());
    }

    fn join_failure(events: Vec<ServerEvent>) -> String {
        match events.as_slice() {
            [ServerEvent::JoinResult(result)] => {
                assert!(!result.ok);
                result.error.as_ref().map(|e| e.code.clone()).expect("error body")
            }
            other => panic!("expected one join result, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_room_id_fails_the_join() {
        let mut d = dispatcher();
        let mut ana = connect(&mut d, ANA);
        send(&mut d, ANA, names::ROOM_JOIN, json!({ "roomId": 12, "displayName": "Ana" }));
        assert_eq!(join_failure(drain(&mut ana)), "invalid_input");
        assert!(d.lobby.registry().is_empty());
    }

    #[test]
    fn test_numeric_display_name_falls_back_to_default() {
        let mut d = dispatcher();
        let mut ana = connect(&mut d, ANA);
        send(&mut d, ANA, names::ROOM_JOIN, json!({ "roomId": "ABC", "displayName": 5 }));

        let events = drain(&mut ana);
        assert!(events.iter().any(|e| matches!(
            e,
            ServerEvent::JoinResult(JoinResult { ok: true, me_id: Some(ANA), .. })
        )));
        let code = RoomCode::parse("ABC").unwrap();
        let room = d.lobby.room(&code).expect("room created");
        assert_eq!(room.participant(ANA).map(|p| p.name.as_str()), Some("Player"));
    }

    #[test]
    fn test_legacy_event_names_route_to_current_handlers() {
        let mut d = dispatcher();
        let mut ana = connect(&mut d, ANA);

        let data = json!({ "gameId": "old1", "playerName": "Ana" });
        send(&mut d, ANA, names::legacy::JOIN_GAME, data);
        assert!(drain(&mut ana).iter().any(|e| matches!(
            e,
            ServerEvent::JoinResult(JoinResult { ok: true, .. })
        )));
        let code = RoomCode::parse("OLD1").unwrap();
        assert_eq!(d.gateway.room_of(ANA), Some(&code));

        send(&mut d, ANA, names::legacy::TOGGLE_READY, serde_json::Value::Null);
        let room = d.lobby.room(&code).unwrap();
        assert_eq!(room.participant(ANA).map(|p| p.ready), Some(true));
        drain(&mut ana);

        send(&mut d, ANA, names::legacy::LEAVE_GAME, serde_json::Value::Null);
        assert!(drain(&mut ana).contains(&ServerEvent::LeaveResult { ok: true }));
        assert!(d.lobby.room(&code).is_none());

        send(&mut d, ANA, names::legacy::CREATE_GAME, json!({ "playerName": "Ana" }));
        assert!(drain(&mut ana).iter().any(|e| matches!(e, ServerEvent::CreateResult(_))));
        assert_eq!(d.lobby.registry().len(), 1);
    }

    #[test]
    fn test_create_then_join_then_ready() {
        let mut d = dispatcher();
        let mut ana = connect(&mut d, ANA);
        let mut ben = connect(&mut d, BEN);

        send(&mut d, ANA, names::ROOM_CREATE, json!({ "displayName": "Ana" }));
        let events = drain(&mut ana);
        let code = events
            .iter()
            .find_map(|event| match event {
                ServerEvent::CreateResult(result) => result.room_id.clone(),
                _ => None,
            })
            .expect("create result");
        assert!(matches!(events.last(), Some(ServerEvent::CreateResult(_))));
        assert!(events.iter().any(|e| matches!(e, ServerEvent::StateUpdate(_))));
        // BEN sees the listing but no room state.
        let ben_events = drain(&mut ben);
        assert!(ben_events.iter().all(|e| matches!(e, ServerEvent::RoomsUpdate { .. })));

        send(&mut d, BEN, names::ROOM_JOIN, json!({ "roomId": code.as_str(), "displayName": "Ben" }));
        assert!(drain(&mut ben).iter().any(|e| matches!(
            e,
            ServerEvent::JoinResult(JoinResult { ok: true, me_id: Some(BEN), .. })
        )));

        send(&mut d, ANA, names::ROOM_READY, serde_json::Value::Null);
        send(&mut d, BEN, names::ROOM_READY, serde_json::Value::Null);
        let last_view = drain(&mut ana)
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::StateUpdate(view) => Some(view),
                _ => None,
            })
            .last()
            .expect("state update");
        assert!(last_view.started);
        assert_eq!(last_view.your_hand.len(), 7);
        assert_eq!(last_view.opponent_count, 7);
        assert_eq!(last_view.turn_id, Some(ANA));
    }

    #[test]
    fn test_join_full_room_reports_in_result() {
        let mut d = dispatcher();
        let _ana = connect(&mut d, ANA);
        let _ben = connect(&mut d, BEN);
        let mut cal = connect(&mut d, PlayerId(3));

        send(&mut d, ANA, names::ROOM_JOIN, json!({ "roomId": "TABLE1" }));
        send(&mut d, BEN, names::ROOM_JOIN, json!({ "roomId": "TABLE1" }));
        drain(&mut cal);
        send(&mut d, PlayerId(3), names::ROOM_JOIN, json!({ "roomId": "table1" }));

        let events = drain(&mut cal);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ServerEvent::JoinResult(result) => {
                assert!(!result.ok);
                assert_eq!(result.error.as_ref().map(|e| e.code.as_str()), Some("room_full"));
            }
            other => panic!("expected join result, got {other:?}"),
        }
    }

    #[test]
    fn test_disconnect_resets_room_for_remaining_player() {
        let mut d = dispatcher();
        let mut ana = connect(&mut d, ANA);
        let _ben = connect(&mut d, BEN);
        send(&mut d, ANA, names::ROOM_JOIN, json!({ "roomId": "DUEL" }));
        send(&mut d, BEN, names::ROOM_JOIN, json!({ "roomId": "DUEL" }));
        send(&mut d, ANA, names::GAME_START, serde_json::Value::Null);
        drain(&mut ana);

        d.handle(Command::Disconnect { player: BEN });

        let events = drain(&mut ana);
        let view = events
            .iter()
            .find_map(|e| match e {
                ServerEvent::StateUpdate(view) => Some(view.clone()),
                _ => None,
            })
            .expect("remaining player is told");
        assert!(!view.started);
        assert!(!view.me_ready);
        assert!(view.your_hand.is_empty());
        assert_eq!(view.opponent_name, None);
        assert!(events.iter().any(|e| matches!(e, ServerEvent::RoomsUpdate { .. })));
        assert!(!d.gateway.is_connected(BEN));
    }

    #[test]
    fn test_leave_acks_even_without_room() {
        let mut d = dispatcher();
        let mut ana = connect(&mut d, ANA);
        send(&mut d, ANA, names::ROOM_LEAVE, serde_json::Value::Null);
        assert_eq!(drain(&mut ana), [ServerEvent::LeaveResult { ok: true }]);
    }

    #[test]
    fn test_ping_pongs() {
        let mut d = dispatcher();
        let mut ana = connect(&mut d, ANA);
        send(&mut d, ANA, names::PING, serde_json::Value::Null);
        assert_eq!(drain(&mut ana), [ServerEvent::Pong]);
    }

    #[test]
    fn test_win_sends_game_end_to_both() {
        let mut d = dispatcher();
        let mut ana = connect(&mut d, ANA);
        let mut ben = connect(&mut d, BEN);
        send(&mut d, ANA, names::ROOM_JOIN, json!({ "roomId": "DUEL" }));
        send(&mut d, BEN, names::ROOM_JOIN, json!({ "roomId": "DUEL" }));
        send(&mut d, ANA, names::GAME_START, serde_json::Value::Null);
        let code = RoomCode::parse("DUEL").unwrap();

        for _ in 0..5_000 {
            let table = d.lobby.room(&code).unwrap().table();
            if table.outcome().is_some() {
                break;
            }
            let player = table.turn().unwrap();
            let top = *table.top_card().unwrap();
            let active = table.active_color();
            let card = table
                .hand(player)
                .iter()
                .find(|card| cardroom_engine::is_playable(card, &top, active))
                .copied();
            match card {
                Some(card) => send(
                    &mut d,
                    player,
                    names::GAME_PLAY,
                    json!({ "cardId": card.id(), "selectedColor": active.to_string() }),
                ),
                None => send(&mut d, player, names::GAME_DRAW, serde_json::Value::Null),
            }
        }

        let outcome = d.lobby.room(&code).unwrap().table().outcome().expect("game finished");
        let game_end = |events: Vec<ServerEvent>| {
            events.into_iter().find_map(|e| match e {
                ServerEvent::GameEnd { outcome, points_earned } => Some((outcome, points_earned)),
                _ => None,
            })
        };
        let (ana_end, ben_end) = (game_end(drain(&mut ana)), game_end(drain(&mut ben)));
        let (winner_end, loser_end) = if outcome.winner_id == ANA {
            (ana_end, ben_end)
        } else {
            (ben_end, ana_end)
        };
        assert_eq!(winner_end, Some((MatchResult::Win, outcome.points)));
        assert_eq!(loser_end, Some((MatchResult::Loss, 0)));
    }
}
