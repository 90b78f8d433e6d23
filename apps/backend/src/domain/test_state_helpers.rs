//! Test-only room builders for domain unit tests.

use time::OffsetDateTime;

use crate::domain::abilities::Character;
use crate::domain::cards::{canonical_ids, DeckKind, DeckState};
use crate::domain::phase::Phase;
use crate::domain::rules::{CellIndex, Slot, STARTING_CASH};
use crate::domain::state::{
    Holding, Player, PlayerIdentity, Room, RoomId, RoomSettings, RoomStatus,
};

/// A playing room with `n` players in slots 1..=n, abilities off, slot 1 to roll.
pub fn playing_room(n: u8) -> Room {
    let settings = RoomSettings {
        abilities_enabled: false,
        ..RoomSettings::default()
    };
    let mut room = Room::new(
        RoomId("room-test".into()),
        "ABC123".into(),
        settings,
        OffsetDateTime::UNIX_EPOCH,
    );
    for slot in 1..=n {
        let mut p = Player::new(
            slot,
            PlayerIdentity::Guest(format!("guest-{slot}")),
            Character::ALL[usize::from(slot - 1)],
        );
        p.cash = STARTING_CASH;
        room.players.push(p);
    }
    room.decks.luck = DeckState {
        cards: canonical_ids(DeckKind::Luck),
        cursor: 0,
    };
    room.decks.opportunity = DeckState {
        cards: canonical_ids(DeckKind::Opportunity),
        cursor: 0,
    };
    room.status = RoomStatus::Playing;
    room.current_slot = 1;
    room.set_phase(Phase::RollDice);
    room
}

pub fn give(room: &mut Room, slot: Slot, cell: CellIndex, houses: u8, hotel: bool) {
    if let Some(p) = room.player_mut(slot) {
        p.holdings.insert(cell, Holding { houses, hotel });
    }
}

pub fn set_cash(room: &mut Room, slot: Slot, cash: i64) {
    if let Some(p) = room.player_mut(slot) {
        p.cash = cash;
    }
}

pub fn with_abilities(mut room: Room) -> Room {
    room.settings.abilities_enabled = true;
    room
}
