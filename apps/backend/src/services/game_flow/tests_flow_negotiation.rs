use super::test_support::Harness;
use crate::domain::actions::PlayerAction;
use crate::domain::economy::{calculate_rent, can_build_in_group, sellable_value};
use crate::domain::events::GameEvent;
use crate::domain::test_state_helpers::{give, playing_room};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

fn market(round: u32) -> Harness {
    let mut room = playing_room(3);
    room.round = round;
    give(&mut room, 1, 1, 0, false);
    give(&mut room, 2, 3, 1, false);
    Harness::new(room)
}

fn offer(cell: u8, price: i64) -> PlayerAction {
    PlayerAction::SendNegotiationOffer { cell, price }
}

#[test]
fn offers_before_round_twenty_are_refused() {
    let mut h = market(10);
    let err = h.act(1, offer(3, 2_000)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NegotiateTooEarly));
    assert!(h.room.negotiation.is_none());
}

#[test]
fn accepted_offer_moves_cell_and_cash_together() {
    let mut h = market(45);
    let events = h.act(1, offer(3, 2_000)).unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::NegotiationOffered { to: 2, cell: 3, .. })));

    let err = h.act(3, PlayerAction::RespondToNegotiation { accept: true }).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotOfferTarget));

    let events = h.act(2, PlayerAction::RespondToNegotiation { accept: true }).unwrap();
    assert!(h.player(1).owns(3));
    assert_eq!(h.player(1).holdings[&3].houses, 1);
    assert!(!h.player(2).owns(3));
    assert_eq!(h.player(1).cash, 13_000);
    assert_eq!(h.player(2).cash, 17_000);
    assert!(events.contains(&GameEvent::GroupCompleted { slot: 1, group: 0 }));
    assert!(h.room.negotiation.is_none());
}

#[test]
fn houses_travel_with_a_traded_cell_outside_a_full_group() {
    let mut room = playing_room(3);
    room.round = 20;
    give(&mut room, 3, 1, 0, false);
    give(&mut room, 2, 3, 2, false);
    let mut h = Harness::new(room);

    h.act(1, offer(3, 2_000)).unwrap();
    let events = h.act(2, PlayerAction::RespondToNegotiation { accept: true }).unwrap();
    assert!(!events.iter().any(|e| matches!(e, GameEvent::GroupCompleted { .. })));

    assert_eq!(h.player(1).holdings[&3].houses, 2);
    assert_eq!(calculate_rent(&h.room, 3, 2), 600);
    assert_eq!(sellable_value(&h.room, 1), 600 + 2 * 400);
    assert!(!can_build_in_group(&h.room, 1, 0));
}

#[test]
fn one_offer_at_a_time() {
    let mut h = market(20);
    h.act(1, offer(3, 500)).unwrap();
    let err = h.act(2, offer(1, 500)).unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::NegotiationPending, _)));
}

#[test]
fn offers_must_target_an_opponent_cell_and_be_affordable() {
    let mut h = market(20);
    let err = h.act(1, offer(1, 500)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotOwner));
    let err = h.act(1, offer(4, 500)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NotOwner));
    let err = h.act(1, offer(3, 50_000)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::InsufficientFunds));
}

#[test]
fn rejection_puts_requester_on_cooldown() {
    let mut h = market(30);
    h.act(1, offer(3, 500)).unwrap();
    h.act(2, PlayerAction::RespondToNegotiation { accept: false }).unwrap();
    assert_eq!(h.room.negotiation_cooldowns.get(&1), Some(&33));

    let err = h.act(1, offer(3, 900)).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NegotiationCooldown));

    h.room.round = 33;
    h.act(1, offer(3, 900)).unwrap();
}

#[test]
fn unanswered_offers_expire() {
    let mut h = market(20);
    h.act(1, offer(3, 500)).unwrap();
    let id = h.room.negotiation.as_ref().map(|o| o.id).unwrap();

    let events = h.run(|flow| flow.expire_negotiation(id + 1)).unwrap();
    assert!(events.is_empty());
    assert!(h.room.negotiation.is_some());

    let events = h.run(|flow| flow.expire_negotiation(id)).unwrap();
    assert_eq!(events, vec![GameEvent::NegotiationExpired { id }]);
    assert!(h.room.negotiation.is_none());

    let err = h.act(2, PlayerAction::RespondToNegotiation { accept: true }).unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::NoPendingOffer));
}

#[test]
fn elimination_cancels_open_offers() {
    let mut h = market(20);
    h.act(1, offer(3, 500)).unwrap();
    h.act(2, PlayerAction::Surrender).unwrap();
    assert!(h.room.negotiation.is_none());
}

#[test]
fn accepting_an_offer_the_requester_cannot_pay_closes_it() {
    let mut h = market(20);
    h.act(1, offer(3, 2_000)).unwrap();
    let id = h.room.negotiation.as_ref().map(|o| o.id).unwrap();
    h.player_mut(1).cash = 1_500;

    let events = h.act(2, PlayerAction::RespondToNegotiation { accept: true }).unwrap();
    assert!(events.contains(&GameEvent::NegotiationResolved { id, accepted: false }));
    assert!(h.room.negotiation.is_none());
    assert!(h.player(2).owns(3));
    assert_eq!(h.player(1).cash, 1_500);
    assert!(h.room.negotiation_cooldowns.get(&1).is_none());

    h.act(2, offer(1, 500)).unwrap();
}

#[test]
fn accepting_an_offer_for_a_cell_that_moved_closes_it() {
    let mut h = market(20);
    h.act(1, offer(3, 2_000)).unwrap();
    let holding = h.player_mut(2).holdings.remove(&3).unwrap();
    h.player_mut(3).holdings.insert(3, holding);

    h.act(2, PlayerAction::RespondToNegotiation { accept: true }).unwrap();
    assert!(h.room.negotiation.is_none());
    assert!(h.player(3).owns(3));
    assert_eq!(h.player(1).cash, 15_000);
}
