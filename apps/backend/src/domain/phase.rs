//! Closed phase enum and the `(phase × action kind) → permitted` table.

use serde::{Deserialize, Serialize};

use crate::domain::rules::{CellIndex, Money};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Room is waiting for players; no turn is running.
    Lobby,
    RollDice,
    /// Buy decision for an unowned cell.
    AwaitingAction { cell: CellIndex },
    /// Build window on the landed cell's group.
    AwaitingBuild { cell: CellIndex },
    AwaitingCardDisplay { card: String },
    IslandTurn,
    AwaitingTravel,
    AwaitingFestival,
    AwaitingSell,
    AwaitingBuyback { cell: CellIndex, price: Money },
    AwaitingFreeBuilding,
    AwaitingDestinationChoice,
    AwaitingTradeChoice,
    AwaitingFreezeChoice,
    AwaitingEminentDomainChoice,
    EndTurn,
    GameOver,
}

/// In-turn action categories gated by the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    RollDice,
    BuyProperty,
    SkipBuy,
    BuildHouse,
    BuildHotel,
    SkipBuild,
    ChooseFreeBuilding,
    TravelTo,
    ApplyFestival,
    EscapeIsland,
    RespondToBuyback,
    SellAssets,
    ChooseCardTarget,
    UseActiveAbility,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Lobby => "LOBBY",
            Phase::RollDice => "ROLL_DICE",
            Phase::AwaitingAction { .. } => "AWAITING_ACTION",
            Phase::AwaitingBuild { .. } => "AWAITING_BUILD",
            Phase::AwaitingCardDisplay { .. } => "AWAITING_CARD_DISPLAY",
            Phase::IslandTurn => "ISLAND_TURN",
            Phase::AwaitingTravel => "AWAITING_TRAVEL",
            Phase::AwaitingFestival => "AWAITING_FESTIVAL",
            Phase::AwaitingSell => "AWAITING_SELL",
            Phase::AwaitingBuyback { .. } => "AWAITING_BUYBACK",
            Phase::AwaitingFreeBuilding => "AWAITING_FREE_BUILDING",
            Phase::AwaitingDestinationChoice => "AWAITING_DESTINATION_CHOICE",
            Phase::AwaitingTradeChoice => "AWAITING_TRADE_CHOICE",
            Phase::AwaitingFreezeChoice => "AWAITING_FREEZE_CHOICE",
            Phase::AwaitingEminentDomainChoice => "AWAITING_EMINENT_DOMAIN_CHOICE",
            Phase::EndTurn => "END_TURN",
            Phase::GameOver => "GAME_OVER",
        }
    }

    pub fn permits(&self, kind: ActionKind) -> bool {
        use ActionKind as A;
        matches!(
            (self, kind),
            (Phase::RollDice, A::RollDice | A::UseActiveAbility)
                | (Phase::AwaitingAction { .. }, A::BuyProperty | A::SkipBuy)
                | (
                    Phase::AwaitingBuild { .. },
                    A::BuildHouse | A::BuildHotel | A::SkipBuild
                )
                | (Phase::AwaitingFreeBuilding, A::ChooseFreeBuilding)
                | (Phase::AwaitingTravel, A::TravelTo)
                | (Phase::AwaitingFestival, A::ApplyFestival)
                | (Phase::IslandTurn, A::EscapeIsland)
                | (Phase::AwaitingBuyback { .. }, A::RespondToBuyback)
                | (Phase::AwaitingSell, A::SellAssets)
                | (
                    Phase::AwaitingDestinationChoice
                        | Phase::AwaitingTradeChoice
                        | Phase::AwaitingFreezeChoice
                        | Phase::AwaitingEminentDomainChoice,
                    A::ChooseCardTarget
                )
        )
    }

    /// Phases that wait on the current player and carry a timeout.
    pub fn is_awaiting_player(&self) -> bool {
        !matches!(
            self,
            Phase::Lobby | Phase::EndTurn | Phase::GameOver | Phase::AwaitingCardDisplay { .. }
        )
    }
}
