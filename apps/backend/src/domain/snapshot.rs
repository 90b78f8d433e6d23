//! Public snapshot of a room for clients. Deck order and guest ids stay
//! server-side.

use serde::Serialize;

use crate::domain::abilities::Character;
use crate::domain::dice::DiceRoll;
use crate::domain::economy::net_worth;
use crate::domain::phase::Phase;
use crate::domain::rules::{CellIndex, Money, Slot};
use crate::domain::state::{
    AbilityState, Buffs, EliminationReason, Festival, FrozenRent, NegotiationOffer, Room,
    RoomSettings, RoomStatus, Winner,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoldingPublic {
    pub cell: CellIndex,
    pub houses: u8,
    pub hotel: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerPublic {
    pub slot: Slot,
    pub user_id: Option<String>,
    pub is_guest: bool,
    pub character: Character,
    pub cash: Money,
    pub net_worth: Money,
    pub position: CellIndex,
    pub holdings: Vec<HoldingPublic>,
    pub held_cards: Vec<String>,
    pub eliminated: Option<EliminationReason>,
    pub connected: bool,
    pub afk: bool,
    pub island_turns: u8,
    pub buffs: Buffs,
    pub ability: AbilityState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeckCounts {
    /// Cards left before the next reshuffle.
    pub luck_remaining: usize,
    pub opportunity_remaining: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSnapshot {
    pub id: String,
    pub join_code: String,
    pub status: RoomStatus,
    pub version: i32,
    pub host: Slot,
    pub phase: Phase,
    pub phase_seq: u64,
    pub current_slot: Slot,
    pub round: u32,
    pub last_dice: Option<DiceRoll>,
    pub players: Vec<PlayerPublic>,
    pub festival: Option<Festival>,
    pub frozen_rent: Vec<FrozenRent>,
    pub negotiation: Option<NegotiationOffer>,
    pub winner: Option<Winner>,
    pub settings: RoomSettings,
    pub decks: DeckCounts,
}

pub fn snapshot(room: &Room) -> RoomSnapshot {
    let remaining = |d: &crate::domain::cards::DeckState| d.cards.len().saturating_sub(d.cursor);
    RoomSnapshot {
        id: room.id.to_string(),
        join_code: room.join_code.clone(),
        status: room.status,
        version: room.version,
        host: room.host,
        phase: room.phase.clone(),
        phase_seq: room.phase_seq,
        current_slot: room.current_slot,
        round: room.round,
        last_dice: room.last_dice,
        players: room
            .players
            .iter()
            .map(|p| PlayerPublic {
                slot: p.slot,
                user_id: p.identity.public_user_id().map(str::to_owned),
                is_guest: p.identity.public_user_id().is_none(),
                character: p.character,
                cash: p.cash,
                net_worth: net_worth(p),
                position: p.position,
                holdings: p
                    .holdings
                    .iter()
                    .map(|(&cell, h)| HoldingPublic {
                        cell,
                        houses: h.houses,
                        hotel: h.hotel,
                    })
                    .collect(),
                held_cards: p.held_cards.clone(),
                eliminated: p.eliminated,
                connected: p.connected,
                afk: p.afk,
                island_turns: p.island_turns,
                buffs: p.buffs.clone(),
                ability: p.ability.clone(),
            })
            .collect(),
        festival: room.festival,
        frozen_rent: room.frozen_rent.clone(),
        negotiation: room.negotiation.clone(),
        winner: room.winner,
        settings: room.settings.clone(),
        decks: DeckCounts {
            luck_remaining: remaining(&room.decks.luck),
            opportunity_remaining: remaining(&room.decks.opportunity),
        },
    }
}
