use time::OffsetDateTime;

use super::test_support::Harness;
use super::{GameFlowService, NewRoom};
use crate::domain::abilities::{AbilityTarget, Character};
use crate::domain::actions::PlayerAction;
use crate::domain::events::GameEvent;
use crate::domain::phase::Phase;
use crate::domain::state::{PlayerIdentity, RoomId, RoomSettings, RoomStatus};
use crate::domain::test_state_helpers::{playing_room, with_abilities};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

fn guest(n: u8) -> PlayerIdentity {
    PlayerIdentity::Guest(format!("guest-{n}"))
}

fn lobby() -> Harness {
    let created = GameFlowService.create_room(NewRoom {
        id: RoomId("room-lobby".into()),
        join_code: "JOIN42".into(),
        host: PlayerIdentity::User("host-user".into()),
        settings: RoomSettings::default(),
        now: OffsetDateTime::UNIX_EPOCH,
    });
    assert_eq!(
        created.events,
        vec![GameEvent::PlayerJoined {
            slot: 1,
            user_id: Some("host-user".into()),
        }]
    );
    Harness::new(created.room)
}

#[test]
fn joining_fills_slots_in_order_and_is_idempotent() {
    let mut h = lobby();
    h.run(|flow| flow.join(guest(2))).unwrap();
    let again = h.run(|flow| flow.join(guest(2))).unwrap();
    assert!(again.is_empty());
    assert_eq!(h.room.players.len(), 2);
    assert_eq!(h.player(2).identity, guest(2));
    assert_ne!(h.player(2).character, h.player(1).character);

    h.run(|flow| flow.join(guest(3))).unwrap();
    h.run(|flow| flow.join(guest(4))).unwrap();
    let err = h.run(|flow| flow.join(guest(5))).unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::RoomFull, _)));
}

#[test]
fn characters_are_unique() {
    let mut h = lobby();
    h.run(|flow| flow.join(guest(2))).unwrap();
    let host_character = h.player(1).character;

    let err = h
        .run(|flow| flow.select_character(2, host_character))
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::CharacterTaken));

    h.run(|flow| flow.select_character(2, Character::Oracle)).unwrap();
    assert_eq!(h.player(2).character, Character::Oracle);
}

#[test]
fn only_the_host_starts_with_enough_players() {
    let mut h = lobby();
    let err = h.run(|flow| flow.start(1)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotEnoughPlayers));

    h.run(|flow| flow.join(guest(2))).unwrap();
    let err = h.run(|flow| flow.start(2)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotHost));

    let events = h.run(|flow| flow.start(1)).unwrap();
    assert_eq!(h.room.status, RoomStatus::Playing);
    assert_eq!(h.room.phase, Phase::RollDice);
    assert_eq!(h.room.current_slot, 1);
    assert!(h.room.players.iter().all(|p| p.cash == 15_000));
    assert_eq!(h.room.decks.luck.cards.len(), 16);
    assert!(events.contains(&GameEvent::GameStarted));
    assert!(events.contains(&GameEvent::TurnBecame { slot: 1, round: 1 }));

    let err = h.run(|flow| flow.join(guest(3))).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::GameAlreadyStarted));
}

#[test]
fn host_leaving_hands_over_and_empty_rooms_are_abandoned() {
    let mut h = lobby();
    h.run(|flow| flow.join(guest(2))).unwrap();

    let events = h.run(|flow| flow.leave(1)).unwrap();
    assert!(events.contains(&GameEvent::HostChanged { slot: 2 }));
    assert_eq!(h.room.host, 2);

    let events = h.run(|flow| flow.leave(2)).unwrap();
    assert_eq!(h.room.status, RoomStatus::Abandoned);
    assert!(events.contains(&GameEvent::GameAbandoned));
}

#[test]
fn disconnect_expiry_respects_reconnection() {
    let mut h = Harness::new(playing_room(3));
    h.run(|flow| flow.set_presence(2, false)).unwrap();
    h.run(|flow| flow.set_presence(2, true)).unwrap();
    h.run(|flow| flow.expire_disconnect(2)).unwrap();
    assert!(h.player(2).is_active());

    h.run(|flow| flow.set_presence(2, false)).unwrap();
    h.run(|flow| flow.expire_disconnect(2)).unwrap();
    assert!(!h.player(2).is_active());
    assert_eq!(h.room.status, RoomStatus::Playing);
}

#[test]
fn room_is_abandoned_when_every_survivor_is_gone() {
    let mut h = Harness::new(playing_room(3));
    for slot in 1..=3 {
        h.run(|flow| flow.set_presence(slot, false)).unwrap();
    }
    h.run(|flow| flow.expire_disconnect(3)).unwrap();
    assert_eq!(h.room.status, RoomStatus::Abandoned);
}

#[test]
fn abilities_respect_cooldown_and_disabled_rooms() {
    let mut h = Harness::new(playing_room(2));
    let err = h
        .act(1, PlayerAction::UseActiveAbility { target: None })
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::AbilitiesDisabled));

    // Slot 1 plays the Banker: +5% of cash, capped at 1500.
    let mut h = Harness::new(with_abilities(playing_room(2)));
    let events = h
        .act(1, PlayerAction::UseActiveAbility { target: None })
        .unwrap();
    assert_eq!(h.player(1).cash, 15_750);
    assert_eq!(h.player(1).ability.cooldown, 5);
    assert_eq!(h.room.phase, Phase::RollDice);
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::AbilityUsed { slot: 1, .. })));

    let err = h
        .act(1, PlayerAction::UseActiveAbility { target: None })
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::AbilityAlreadyUsed));
}

#[test]
fn movement_abilities_replace_the_roll() {
    let mut room = with_abilities(playing_room(2));
    room.player_mut(1).unwrap().character = Character::Traveler;
    room.player_mut(1).unwrap().position = 2;
    let mut h = Harness::new(room);

    h.act(1, PlayerAction::UseActiveAbility {
        target: Some(AbilityTarget::Cell { cell: 13 }),
    })
    .unwrap();
    assert_eq!(h.player(1).position, 13);
    assert_eq!(h.player(1).cash, 15_000);
    assert_eq!(h.room.phase, Phase::AwaitingAction { cell: 13 });
}
