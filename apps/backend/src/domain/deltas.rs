//! Effect descriptions returned by the card and ability subsystems.
//!
//! Subsystems never touch the room; the orchestrator applies these to its
//! working copy in order.

use serde::Serialize;

use crate::domain::cards::DeckKind;
use crate::domain::rules::{CellIndex, Money, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MoneyReason {
    Rent,
    Tax,
    Salary,
    GoBonus,
    Card,
    Ability,
    Purchase,
    Build,
    Buyback,
    Negotiation,
    Sale,
    IslandFee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "buff", rename_all = "snake_case")]
pub enum BuffChange {
    SkipNextTurn,
    RentImmunity,
    DoubleRent { turns: u8 },
    BlockBuying { turns: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateDelta {
    Credit {
        slot: Slot,
        amount: Money,
        reason: MoneyReason,
    },
    Debit {
        slot: Slot,
        amount: Money,
        reason: MoneyReason,
    },
    Transfer {
        from: Slot,
        to: Slot,
        amount: Money,
        reason: MoneyReason,
    },
    /// Set a position without resolving the landing.
    Teleport { slot: Slot, cell: CellIndex },
    SwapPositions { a: Slot, b: Slot },
    /// Move a cell, with its buildings, between two players.
    TransferCell { from: Slot, to: Slot, cell: CellIndex },
    SetBuilding {
        cell: CellIndex,
        houses: u8,
        hotel: bool,
    },
    SetBuff { slot: Slot, change: BuffChange },
    HoldCard { slot: Slot, card: String },
    FreezeRent { cell: CellIndex, turns: u8 },
    ApplyFestival { slot: Slot, cell: CellIndex },
    ReshuffleDeck { deck: DeckKind },
}
