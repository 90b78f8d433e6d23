use super::test_support::Harness;
use crate::domain::actions::{PlayerAction, SellSelection};
use crate::domain::events::GameEvent;
use crate::domain::phase::Phase;
use crate::domain::state::{EliminationReason, Festival, FrozenRent, RoomStatus};
use crate::domain::test_state_helpers::{give, playing_room, set_cash};
use crate::errors::domain::ValidationKind;

/// Slot 2 is about to land on slot 1's three-house cell 3 (rent 1200).
fn rent_trap(cash: i64) -> Harness {
    let mut room = playing_room(3);
    give(&mut room, 1, 3, 3, false);
    room.current_slot = 2;
    set_cash(&mut room, 2, cash);
    Harness::new(room).with_rolls([(1, 2)])
}

#[test]
fn selling_a_hotel_clears_the_debt() {
    let mut h = rent_trap(900);
    give(&mut h.room, 2, 19, 0, true);

    let events = h.act(2, PlayerAction::RollDice).unwrap();
    assert_eq!(h.player(2).cash, -300);
    assert_eq!(h.room.phase, Phase::AwaitingSell);
    let started = events.iter().find_map(|e| match e {
        GameEvent::LiquidationStarted { slot, deficit, prices } => Some((*slot, *deficit, prices.clone())),
        _ => None,
    });
    let (slot, deficit, prices) = started.unwrap();
    assert_eq!((slot, deficit), (2, 300));
    assert_eq!(prices.len(), 1);
    assert_eq!(prices[0].hotel, 2_200);

    h.act(2, PlayerAction::SellAssets {
        selections: vec![SellSelection::Hotel { cell: 19 }],
    })
    .unwrap();
    assert_eq!(h.player(2).cash, 1_900);
    assert!(h.player(2).is_active());
    assert!(h.player(2).owns(19));
    assert!(!h.player(2).holdings[&19].hotel);
    assert_eq!(h.room.current_slot, 3);
}

#[test]
fn partial_sale_keeps_the_sell_phase() {
    let mut h = rent_trap(0);
    give(&mut h.room, 2, 4, 0, false);
    give(&mut h.room, 2, 8, 0, false);

    h.act(2, PlayerAction::RollDice).unwrap();
    assert_eq!(h.room.phase, Phase::AwaitingSell);

    h.act(2, PlayerAction::SellAssets {
        selections: vec![SellSelection::Property { cell: 4 }],
    })
    .unwrap();
    assert_eq!(h.player(2).cash, -400);
    assert_eq!(h.room.phase, Phase::AwaitingSell);

    let err = h
        .act(2, PlayerAction::SellAssets {
            selections: vec![SellSelection::House { cell: 8 }],
        })
        .unwrap_err();
    assert_eq!(err.validation_kind(), Some(&ValidationKind::InvalidSelection));

    h.act(2, PlayerAction::SellAssets {
        selections: vec![SellSelection::Property { cell: 8 }],
    })
    .unwrap();
    assert_eq!(h.player(2).cash, 400);
    assert!(h.player(2).holdings.is_empty());
    assert_eq!(h.room.current_slot, 3);
}

#[test]
fn sell_timeout_liquidates_buildings_first() {
    let mut h = rent_trap(1_000);
    give(&mut h.room, 2, 10, 2, false);
    give(&mut h.room, 2, 12, 1, false);
    give(&mut h.room, 2, 13, 1, false);

    h.act(2, PlayerAction::RollDice).unwrap();
    assert_eq!(h.player(2).cash, -200);
    h.timeout().unwrap();

    // One house raises 600, which is enough.
    assert_eq!(h.player(2).cash, 400);
    assert_eq!(h.player(2).holdings[&10].houses, 1);
    assert_eq!(h.player(2).holdings.len(), 3);
    assert_eq!(h.room.current_slot, 3);
}

#[test]
fn insolvency_beyond_assets_bankrupts_at_once() {
    let mut h = rent_trap(100);
    give(&mut h.room, 2, 1, 0, false);
    h.room.festival = Some(Festival {
        owner: 2,
        cell: 1,
        multiplier: 2,
    });
    h.room.frozen_rent.push(FrozenRent {
        cell: 1,
        remaining_turns: 3,
    });

    let events = h.act(2, PlayerAction::RollDice).unwrap();
    assert!(events.contains(&GameEvent::PlayerEliminated {
        slot: 2,
        reason: EliminationReason::Bankrupt,
    }));
    let player = h.player(2);
    assert_eq!(player.cash, 0);
    assert!(player.holdings.is_empty());
    assert!(h.room.festival.is_none());
    assert!(h.room.frozen_rent.is_empty());
    assert_eq!(h.room.status, RoomStatus::Playing);
    assert_eq!(h.room.current_slot, 3);
}

#[test]
fn tax_insolvency_uses_the_same_path() {
    let mut room = playing_room(2);
    room.player_mut(1).unwrap().position = 3;
    set_cash(&mut room, 1, 200);
    let mut h = Harness::new(room).with_rolls([(1, 2)]);

    h.act(1, PlayerAction::RollDice).unwrap();
    assert_eq!(h.room.status, RoomStatus::Finished);
    assert_eq!(h.room.winner.map(|w| w.slot), Some(2));
}
