//! Integration tests for the lobby: room lifecycle from create to delete,
//! driven through the public API with a seeded RNG.

use cardroom_engine::{GameError, Play, is_playable};
use cardroom_protocol::{PlayerId, RoomCode};
use cardroom_room::{Departure, Lobby, RoomConfig, RoomError, RoomPhase, view};
use rand::SeedableRng;
use rand::rngs::StdRng;

const ANA: PlayerId = PlayerId(1);
const BEN: PlayerId = PlayerId(2);
const CAL: PlayerId = PlayerId(3);

fn lobby() -> (Lobby, StdRng) {
    (Lobby::new(RoomConfig::default()), StdRng::seed_from_u64(42))
}

/// ANA creates a room, BEN joins, both ready up.
fn dealt_room(lobby: &mut Lobby, rng: &mut StdRng) -> RoomCode {
    let code = lobby.create_room(ANA, None, Some("Ana"), rng).unwrap().code;
    lobby.join_room(BEN, None, Some(code.as_str()), Some("Ben")).unwrap();
    assert!(!lobby.toggle_ready(&code, ANA, rng).unwrap().dealt);
    assert!(lobby.toggle_ready(&code, BEN, rng).unwrap().dealt);
    code
}

/// Plays greedily until someone wins.
fn play_to_win(lobby: &mut Lobby, code: &RoomCode, rng: &mut StdRng) -> PlayerId {
    for _ in 0..5_000 {
        let room = lobby.room(code).unwrap();
        let table = room.table();
        let player = table.turn().unwrap();
        let top = *table.top_card().unwrap();
        let card = table
            .hand(player)
            .iter()
            .find(|card| is_playable(card, &top, table.active_color()))
            .copied();
        let color = Some(table.active_color());

        match card {
            Some(card) => {
                if let Play::Won(outcome) =
                    lobby.play(code, player, Some(card.id()), color, rng).unwrap()
                {
                    return outcome.winner_id;
                }
            }
            None => {
                lobby.draw(code, player, rng).unwrap();
            }
        }
    }
    panic!("game did not finish");
}

#[test]
fn test_create_seats_creator() {
    let (mut lobby, mut rng) = lobby();
    let joined = lobby.create_room(ANA, None, Some("  Ana!  "), &mut rng).unwrap();

    assert!(!joined.started);
    assert_eq!(joined.left, None);
    let room = lobby.room(&joined.code).unwrap();
    assert_eq!(room.participants().len(), 1);
    assert_eq!(room.participant(ANA).unwrap().name, "Ana");
    assert_eq!(room.phase(), RoomPhase::Waiting);
}

#[test]
fn test_join_fresh_code_creates_room() {
    let (mut lobby, _) = lobby();
    let joined = lobby.join_room(ANA, None, Some("party7"), None).unwrap();
    assert_eq!(joined.code.as_str(), "PARTY7");
    assert_eq!(lobby.room(&joined.code).unwrap().participant(ANA).unwrap().name, "Player");
}

#[test]
fn test_join_rejects_empty_code() {
    let (mut lobby, _) = lobby();
    let err = lobby.join_room(ANA, None, Some(" !! "), None).unwrap_err();
    assert_eq!(err.code(), "invalid_input");
    assert!(lobby.registry().is_empty());
}

#[test]
fn test_third_player_gets_room_full() {
    let (mut lobby, mut rng) = lobby();
    let code = dealt_room(&mut lobby, &mut rng);

    let err = lobby.join_room(CAL, None, Some(code.as_str()), None).unwrap_err();
    assert_eq!(err, RoomError::RoomFull(code.clone()));
    assert_eq!(lobby.room(&code).unwrap().participants().len(), 2);
}

#[test]
fn test_rejoin_updates_name_and_keeps_seat() {
    let (mut lobby, mut rng) = lobby();
    let code = dealt_room(&mut lobby, &mut rng);

    let joined = lobby
        .join_room(BEN, Some(&code), Some(code.as_str()), Some("Benji"))
        .unwrap();
    assert!(joined.started);
    let room = lobby.room(&code).unwrap();
    assert_eq!(room.participants().len(), 2);
    assert_eq!(room.participant(BEN).unwrap().name, "Benji");
    assert!(room.participant(BEN).unwrap().ready);
}

#[test]
fn test_joining_another_room_leaves_the_first() {
    let (mut lobby, mut rng) = lobby();
    let code = dealt_room(&mut lobby, &mut rng);

    let joined = lobby.join_room(BEN, Some(&code), Some("other"), None).unwrap();
    assert_eq!(joined.left, Some((code.clone(), Departure::Reset)));
    assert!(!lobby.room(&code).unwrap().is_member(BEN));
    assert!(lobby.room(&joined.code).unwrap().is_member(BEN));
}

#[test]
fn test_full_room_rejection_keeps_current_seat() {
    let (mut lobby, mut rng) = lobby();
    let full = dealt_room(&mut lobby, &mut rng);
    let mine = lobby.join_room(CAL, None, Some("mine"), None).unwrap().code;

    assert!(lobby.join_room(CAL, Some(&mine), Some(full.as_str()), None).is_err());
    assert!(lobby.room(&mine).unwrap().is_member(CAL));
}

#[test]
fn test_ready_alone_never_deals() {
    let (mut lobby, mut rng) = lobby();
    let code = lobby.create_room(ANA, None, None, &mut rng).unwrap().code;
    let toggle = lobby.toggle_ready(&code, ANA, &mut rng).unwrap();
    assert!(toggle.ready);
    assert!(!toggle.dealt);
    assert!(!lobby.room(&code).unwrap().started());
}

#[test]
fn test_ready_toggles_back() {
    let (mut lobby, mut rng) = lobby();
    let code = lobby.create_room(ANA, None, None, &mut rng).unwrap().code;
    assert!(lobby.toggle_ready(&code, ANA, &mut rng).unwrap().ready);
    assert!(!lobby.toggle_ready(&code, ANA, &mut rng).unwrap().ready);
}

#[test]
fn test_both_ready_deals() {
    let (mut lobby, mut rng) = lobby();
    let code = dealt_room(&mut lobby, &mut rng);
    let room = lobby.room(&code).unwrap();

    assert_eq!(room.phase(), RoomPhase::InProgress);
    assert_eq!(room.table().hand(ANA).len(), 7);
    assert_eq!(room.table().hand(BEN).len(), 7);
    assert_eq!(room.table().turn(), Some(ANA), "creator moves first");
}

#[test]
fn test_force_start_needs_opponent() {
    let (mut lobby, mut rng) = lobby();
    let code = lobby.create_room(ANA, None, None, &mut rng).unwrap().code;
    assert_eq!(lobby.force_start(&code, ANA, &mut rng), Err(RoomError::NoOpponent));

    lobby.join_room(BEN, None, Some(code.as_str()), None).unwrap();
    lobby.force_start(&code, ANA, &mut rng).unwrap();
    let room = lobby.room(&code).unwrap();
    assert!(room.started());
    assert!(room.participants().iter().all(|p| p.ready));
}

#[test]
fn test_actions_outside_a_room() {
    let (mut lobby, mut rng) = lobby();
    let code = dealt_room(&mut lobby, &mut rng);

    assert_eq!(
        lobby.draw(&code, CAL, &mut rng),
        Err(RoomError::NotInRoom(CAL))
    );
    let ghost = RoomCode::parse("GHOST").unwrap();
    assert_eq!(
        lobby.toggle_ready(&ghost, ANA, &mut rng),
        Err(RoomError::RoomNotFound(ghost))
    );
}

#[test]
fn test_play_without_card_id_is_invalid_input() {
    let (mut lobby, mut rng) = lobby();
    let code = dealt_room(&mut lobby, &mut rng);
    let err = lobby.play(&code, ANA, None, None, &mut rng).unwrap_err();
    assert_eq!(err.code(), "invalid_input");
}

#[test]
fn test_win_is_terminal_until_rematch() {
    let (mut lobby, mut rng) = lobby();
    let code = dealt_room(&mut lobby, &mut rng);
    let winner = play_to_win(&mut lobby, &code, &mut rng);
    let loser = if winner == ANA { BEN } else { ANA };

    let room = lobby.room(&code).unwrap();
    assert_eq!(room.phase(), RoomPhase::Finished);
    let outcome = room.table().outcome().unwrap();
    assert_eq!(outcome.winner_id, winner);
    assert_eq!(outcome.points, cardroom_engine::hand_points(room.table().hand(loser)));
    assert!(room.participants().iter().all(|p| !p.ready));

    assert_eq!(
        lobby.draw(&code, loser, &mut rng),
        Err(RoomError::Game(GameError::GameNotRunning))
    );

    // One ready is not enough; the second deals a fresh game.
    assert!(!lobby.toggle_ready(&code, winner, &mut rng).unwrap().dealt);
    assert_eq!(lobby.room(&code).unwrap().phase(), RoomPhase::Finished);
    assert!(lobby.toggle_ready(&code, loser, &mut rng).unwrap().dealt);

    let room = lobby.room(&code).unwrap();
    assert_eq!(room.phase(), RoomPhase::InProgress);
    assert!(room.table().outcome().is_none());
}

#[test]
fn test_force_start_after_win() {
    let (mut lobby, mut rng) = lobby();
    let code = dealt_room(&mut lobby, &mut rng);
    play_to_win(&mut lobby, &code, &mut rng);

    lobby.force_start(&code, ANA, &mut rng).unwrap();
    assert_eq!(lobby.room(&code).unwrap().phase(), RoomPhase::InProgress);
}

#[test]
fn test_leave_mid_game_resets_room() {
    let (mut lobby, mut rng) = lobby();
    let code = dealt_room(&mut lobby, &mut rng);

    assert_eq!(lobby.leave(&code, BEN), Ok(Departure::Reset));

    let room = lobby.room(&code).unwrap();
    assert_eq!(room.phase(), RoomPhase::Waiting);
    assert!(!room.started());
    assert!(room.table().outcome().is_none());
    assert_eq!(room.table().cards().count(), 0);
    assert!(!room.participant(ANA).unwrap().ready);

    let view = view::project(room, ANA);
    assert!(view.your_hand.is_empty());
    assert_eq!(view.opponent_name, None);
    assert_eq!(view.opponent_ready, None);
    assert_eq!(view.top_card, None);
    assert_eq!(view.turn_id, None);
}

#[test]
fn test_last_leave_deletes_room() {
    let (mut lobby, mut rng) = lobby();
    let code = dealt_room(&mut lobby, &mut rng);

    assert_eq!(lobby.leave(&code, BEN), Ok(Departure::Reset));
    assert_eq!(lobby.leave(&code, ANA), Ok(Departure::Deleted));
    assert!(lobby.room(&code).is_none());
    assert!(lobby.list().is_empty());
}

#[test]
fn test_views_hide_opponent_hand() {
    let (mut lobby, mut rng) = lobby();
    let code = dealt_room(&mut lobby, &mut rng);
    let room = lobby.room(&code).unwrap();

    let ana = view::project(room, ANA);
    let ben = view::project(room, BEN);

    assert_eq!(ana.your_hand, room.table().hand(ANA));
    assert_eq!(ben.your_hand, room.table().hand(BEN));
    assert_eq!(ana.opponent_count, 7);
    assert_eq!(ana.opponent_name.as_deref(), Some("Ben"));
    assert_eq!(ben.me_name, "Ben");
    assert!(ana.your_hand.iter().all(|card| !ben.your_hand.contains(card)));

    let json = serde_json::to_string(&ana).unwrap();
    for card in &ben.your_hand {
        assert!(
            !json.contains(&format!("\"id\":{},", card.id().0)),
            "opponent card {} leaked",
            card.id()
        );
    }
}

#[test]
fn test_listing_exposes_only_summary_fields() {
    let (mut lobby, mut rng) = lobby();
    let code = dealt_room(&mut lobby, &mut rng);

    let listing = lobby.list();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].room_id, code);
    assert_eq!(listing[0].players_count, 2);
    assert!(listing[0].started);
    assert!(!listing[0].over);

    let json = serde_json::to_value(&listing[0]).unwrap();
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 5);
    assert!(!keys.contains(&"yourHand"));
}
