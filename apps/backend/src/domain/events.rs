//! Room-scoped events broadcast after every committed mutation.

use serde::Serialize;

use crate::domain::abilities::Character;
use crate::domain::actions::EscapeMethod;
use crate::domain::board::GroupId;
use crate::domain::cards::DeckKind;
use crate::domain::deltas::{BuffChange, MoneyReason};
use crate::domain::economy::SellPrice;
use crate::domain::phase::Phase;
use crate::domain::rules::{CellIndex, Money, Slot};
use crate::domain::state::{EliminationReason, Winner};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    PlayerJoined {
        slot: Slot,
        user_id: Option<String>,
    },
    PlayerLeft {
        slot: Slot,
    },
    CharacterSelected {
        slot: Slot,
        character: Character,
    },
    HostChanged {
        slot: Slot,
    },
    GameStarted,
    TurnBecame {
        slot: Slot,
        round: u32,
    },
    PhaseChanged {
        phase: Phase,
    },
    DiceRolled {
        slot: Slot,
        d1: u8,
        d2: u8,
        doubles: bool,
    },
    Moved {
        slot: Slot,
        from: CellIndex,
        to: CellIndex,
        passed_go: bool,
    },
    MoneyChanged {
        slot: Slot,
        delta: Money,
        balance: Money,
        reason: MoneyReason,
    },
    RentPaid {
        payer: Slot,
        owner: Slot,
        cell: CellIndex,
        amount: Money,
    },
    RentWaived {
        slot: Slot,
        cell: CellIndex,
    },
    PropertyBought {
        slot: Slot,
        cell: CellIndex,
        price: Money,
    },
    CellTransferred {
        from: Slot,
        to: Slot,
        cell: CellIndex,
    },
    BuildingChanged {
        cell: CellIndex,
        houses: u8,
        hotel: bool,
    },
    GroupCompleted {
        slot: Slot,
        group: GroupId,
    },
    CardDrawn {
        slot: Slot,
        deck: DeckKind,
        card: String,
        title: String,
    },
    CardHeld {
        slot: Slot,
        card: String,
    },
    CardUsed {
        slot: Slot,
        card: String,
    },
    DeckReshuffled {
        deck: DeckKind,
    },
    SentToIsland {
        slot: Slot,
    },
    IslandEscaped {
        slot: Slot,
        method: EscapeMethod,
    },
    IslandAttemptFailed {
        slot: Slot,
        turns_left: u8,
    },
    FestivalApplied {
        slot: Slot,
        cell: CellIndex,
        multiplier: u8,
    },
    RentFrozen {
        cell: CellIndex,
        turns: u8,
    },
    BuffApplied {
        slot: Slot,
        change: BuffChange,
    },
    BuybackOffered {
        slot: Slot,
        cell: CellIndex,
        price: Money,
    },
    BuybackResolved {
        slot: Slot,
        cell: CellIndex,
        accepted: bool,
    },
    LiquidationStarted {
        slot: Slot,
        deficit: Money,
        prices: Vec<SellPrice>,
    },
    AssetsSold {
        slot: Slot,
        proceeds: Money,
    },
    ExtraTurn {
        slot: Slot,
    },
    TurnSkipped {
        slot: Slot,
    },
    AbilityUsed {
        slot: Slot,
        character: Character,
        name: String,
    },
    NegotiationOffered {
        id: u64,
        from: Slot,
        to: Slot,
        cell: CellIndex,
        price: Money,
    },
    NegotiationResolved {
        id: u64,
        accepted: bool,
    },
    NegotiationExpired {
        id: u64,
    },
    PlayerEliminated {
        slot: Slot,
        reason: EliminationReason,
    },
    PresenceChanged {
        slot: Slot,
        connected: bool,
    },
    AfkChanged {
        slot: Slot,
        afk: bool,
    },
    TimeoutApplied {
        slot: Slot,
        phase: String,
    },
    TurnForced {
        slot: Slot,
    },
    GameEnded {
        winner: Option<Winner>,
    },
    GameAbandoned,
}
