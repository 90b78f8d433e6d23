//! Inbound player actions, as received over HTTP and WebSocket.

use serde::{Deserialize, Serialize};

use crate::domain::abilities::AbilityTarget;
use crate::domain::card_effects::CardTarget;
use crate::domain::phase::ActionKind;
use crate::domain::rules::{CellIndex, Money};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapeMethod {
    Pay,
    Roll,
    Card,
}

/// One entry of a `sellAssets` batch. Selling land sells its buildings too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SellSelection {
    House { cell: CellIndex },
    Hotel { cell: CellIndex },
    Property { cell: CellIndex },
}

impl SellSelection {
    pub fn cell(&self) -> CellIndex {
        match *self {
            SellSelection::House { cell }
            | SellSelection::Hotel { cell }
            | SellSelection::Property { cell } => cell,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerAction {
    RollDice,
    BuyProperty,
    SkipBuy,
    BuildHouse { cell: CellIndex },
    BuildHotel { cell: CellIndex },
    SkipBuild,
    ChooseFreeBuilding { cell: CellIndex },
    TravelTo { cell: CellIndex },
    ApplyFestival { cell: CellIndex },
    EscapeIsland { method: EscapeMethod },
    RespondToBuyback { accept: bool },
    SellAssets { selections: Vec<SellSelection> },
    ChooseCardTarget { target: CardTarget },
    UseActiveAbility {
        #[serde(default)]
        target: Option<AbilityTarget>,
    },
    SendNegotiationOffer { cell: CellIndex, price: Money },
    RespondToNegotiation { accept: bool },
    Surrender,
}

impl PlayerAction {
    /// Transition-table category for in-turn actions. Negotiation and
    /// surrender are allowed outside the turn and return `None`.
    pub fn kind(&self) -> Option<ActionKind> {
        use ActionKind as K;
        Some(match self {
            PlayerAction::RollDice => K::RollDice,
            PlayerAction::BuyProperty => K::BuyProperty,
            PlayerAction::SkipBuy => K::SkipBuy,
            PlayerAction::BuildHouse { .. } => K::BuildHouse,
            PlayerAction::BuildHotel { .. } => K::BuildHotel,
            PlayerAction::SkipBuild => K::SkipBuild,
            PlayerAction::ChooseFreeBuilding { .. } => K::ChooseFreeBuilding,
            PlayerAction::TravelTo { .. } => K::TravelTo,
            PlayerAction::ApplyFestival { .. } => K::ApplyFestival,
            PlayerAction::EscapeIsland { .. } => K::EscapeIsland,
            PlayerAction::RespondToBuyback { .. } => K::RespondToBuyback,
            PlayerAction::SellAssets { .. } => K::SellAssets,
            PlayerAction::ChooseCardTarget { .. } => K::ChooseCardTarget,
            PlayerAction::UseActiveAbility { .. } => K::UseActiveAbility,
            PlayerAction::SendNegotiationOffer { .. }
            | PlayerAction::RespondToNegotiation { .. }
            | PlayerAction::Surrender => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            PlayerAction::RollDice => "rollDice",
            PlayerAction::BuyProperty => "buyProperty",
            PlayerAction::SkipBuy => "skipBuy",
            PlayerAction::BuildHouse { .. } => "buildHouse",
            PlayerAction::BuildHotel { .. } => "buildHotel",
            PlayerAction::SkipBuild => "skipBuild",
            PlayerAction::ChooseFreeBuilding { .. } => "chooseFreeBuilding",
            PlayerAction::TravelTo { .. } => "travelTo",
            PlayerAction::ApplyFestival { .. } => "applyFestival",
            PlayerAction::EscapeIsland { .. } => "escapeIsland",
            PlayerAction::RespondToBuyback { .. } => "respondToBuyback",
            PlayerAction::SellAssets { .. } => "sellAssets",
            PlayerAction::ChooseCardTarget { .. } => "chooseCardTarget",
            PlayerAction::UseActiveAbility { .. } => "useActiveAbility",
            PlayerAction::SendNegotiationOffer { .. } => "sendNegotiationOffer",
            PlayerAction::RespondToNegotiation { .. } => "respondToNegotiation",
            PlayerAction::Surrender => "surrender",
        }
    }
}
