//! Character roster: passive modifiers and cooldown-gated actives.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::board::{self, GO_TO_ISLAND_CELL};
use crate::domain::cards::DeckKind;
use crate::domain::deltas::{BuffChange, MoneyReason, StateDelta};
use crate::domain::economy;
use crate::domain::rules::{percent_of, CellIndex, Money, Slot, BOARD_SIZE};
use crate::domain::state::Room;
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Character {
    Banker,
    Landlord,
    Architect,
    Gambler,
    Traveler,
    Merchant,
    Diplomat,
    Thief,
    Mayor,
    Pilot,
    Saboteur,
    Magnate,
    Oracle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassiveHook {
    GoSalary,
    RentCollected,
    RentPaid,
    StationRentCollected,
    BuildCost,
    CardMoneyGain,
    CardMoneyLoss,
    IslandFee,
    PurchasePrice,
    BuybackPrice,
    TaxPaid,
    SellValue,
    FestivalMultiplier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// Signed percentage added to the amount.
    Percent(i64),
    Flat(Money),
}

impl Modifier {
    pub fn apply(&self, amount: Money) -> Money {
        match *self {
            Modifier::Percent(pct) => amount + percent_of(amount, pct),
            Modifier::Flat(delta) => amount + delta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Passive {
    pub hook: PassiveHook,
    pub modifier: Modifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    None,
    SingleOpponent,
    BoardCell,
    OpponentBuilding,
    StepCount,
    DeckChoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveDef {
    pub name: &'static str,
    pub target: TargetKind,
    pub cooldown: u8,
}

/// Target supplied with `useActiveAbility`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbilityTarget {
    Opponent { slot: Slot },
    Cell { cell: CellIndex },
    Steps { steps: u8 },
    Deck { deck: DeckKind },
}

const fn passive(hook: PassiveHook, modifier: Modifier) -> Passive {
    Passive { hook, modifier }
}

const fn active(name: &'static str, target: TargetKind, cooldown: u8) -> ActiveDef {
    ActiveDef {
        name,
        target,
        cooldown,
    }
}

use Modifier::{Flat, Percent};
use PassiveHook as H;

const BANKER_PASSIVES: &[Passive] = &[passive(H::GoSalary, Flat(500))];
const LANDLORD_PASSIVES: &[Passive] = &[passive(H::RentCollected, Percent(15))];
const ARCHITECT_PASSIVES: &[Passive] = &[passive(H::BuildCost, Percent(-15))];
const GAMBLER_PASSIVES: &[Passive] = &[
    passive(H::CardMoneyGain, Percent(25)),
    passive(H::CardMoneyLoss, Percent(-25)),
];
const TRAVELER_PASSIVES: &[Passive] = &[passive(H::IslandFee, Percent(-50))];
const MERCHANT_PASSIVES: &[Passive] = &[passive(H::PurchasePrice, Percent(-10))];
const DIPLOMAT_PASSIVES: &[Passive] = &[passive(H::RentPaid, Percent(-15))];
const THIEF_PASSIVES: &[Passive] = &[passive(H::BuybackPrice, Percent(-10))];
const MAYOR_PASSIVES: &[Passive] = &[passive(H::TaxPaid, Percent(-50))];
const PILOT_PASSIVES: &[Passive] = &[passive(H::StationRentCollected, Percent(25))];
const SABOTEUR_PASSIVES: &[Passive] = &[passive(H::CardMoneyLoss, Percent(-25))];
const MAGNATE_PASSIVES: &[Passive] = &[passive(H::SellValue, Percent(10))];
const ORACLE_PASSIVES: &[Passive] = &[passive(H::FestivalMultiplier, Flat(1))];

impl Character {
    pub const ALL: [Character; 13] = [
        Character::Banker,
        Character::Landlord,
        Character::Architect,
        Character::Gambler,
        Character::Traveler,
        Character::Merchant,
        Character::Diplomat,
        Character::Thief,
        Character::Mayor,
        Character::Pilot,
        Character::Saboteur,
        Character::Magnate,
        Character::Oracle,
    ];

    pub fn passives(&self) -> &'static [Passive] {
        match self {
            Character::Banker => BANKER_PASSIVES,
            Character::Landlord => LANDLORD_PASSIVES,
            Character::Architect => ARCHITECT_PASSIVES,
            Character::Gambler => GAMBLER_PASSIVES,
            Character::Traveler => TRAVELER_PASSIVES,
            Character::Merchant => MERCHANT_PASSIVES,
            Character::Diplomat => DIPLOMAT_PASSIVES,
            Character::Thief => THIEF_PASSIVES,
            Character::Mayor => MAYOR_PASSIVES,
            Character::Pilot => PILOT_PASSIVES,
            Character::Saboteur => SABOTEUR_PASSIVES,
            Character::Magnate => MAGNATE_PASSIVES,
            Character::Oracle => ORACLE_PASSIVES,
        }
    }

    pub fn active(&self) -> ActiveDef {
        use TargetKind as T;
        match self {
            Character::Banker => active("Compound Interest", T::None, 5),
            Character::Landlord => active("Collect Dues", T::None, 6),
            Character::Architect => active("Blueprint", T::BoardCell, 6),
            Character::Gambler => active("Double or Nothing", T::None, 5),
            Character::Traveler => active("Jet Set", T::BoardCell, 7),
            Character::Merchant => active("Hostile Bid", T::BoardCell, 8),
            Character::Diplomat => active("Ceasefire", T::None, 6),
            Character::Thief => active("Heist", T::SingleOpponent, 7),
            Character::Mayor => active("Festival Decree", T::BoardCell, 8),
            Character::Pilot => active("Slipstream", T::StepCount, 7),
            Character::Saboteur => active("Demolition", T::OpponentBuilding, 8),
            Character::Magnate => active("Dividend", T::None, 6),
            Character::Oracle => active("Foresight", T::DeckChoice, 5),
        }
    }
}

/// Apply `slot`'s passives for `hook` to `amount`. Identity when abilities are
/// off for the room or the player is gone. Never returns a negative amount.
pub fn apply_passive(room: &Room, slot: Slot, hook: PassiveHook, amount: Money) -> Money {
    if !room.settings.abilities_enabled {
        return amount;
    }
    let Some(player) = room.player(slot).filter(|p| p.is_active()) else {
        return amount;
    };
    player
        .character
        .passives()
        .iter()
        .filter(|p| p.hook == hook)
        .fold(amount, |acc, p| p.modifier.apply(acc))
        .max(0)
}

const BANKER_RATE_PERCENT: i64 = 5;
const BANKER_CAP: Money = 1_500;
const LANDLORD_DUES: Money = 200;
const GAMBLER_WIN: Money = 1_000;
const GAMBLER_LOSS: Money = 500;
const THIEF_RATE_PERCENT: i64 = 10;
const THIEF_CAP: Money = 1_500;
const MAGNATE_PER_CELL: Money = 100;

/// What happens after an active's deltas are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityFollowUp {
    None,
    /// Teleport then resolve the landing.
    MoveTo { cell: CellIndex },
    /// Walk forward instead of rolling.
    MoveSteps { steps: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbilityResolution {
    pub deltas: Vec<StateDelta>,
    pub follow_up: AbilityFollowUp,
}

impl AbilityResolution {
    fn deltas(deltas: Vec<StateDelta>) -> Self {
        Self {
            deltas,
            follow_up: AbilityFollowUp::None,
        }
    }
}

fn invalid_target(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::InvalidTarget, detail)
}

fn target_cell(target: Option<AbilityTarget>) -> Result<CellIndex, DomainError> {
    match target {
        Some(AbilityTarget::Cell { cell }) if cell < BOARD_SIZE => Ok(cell),
        _ => Err(invalid_target("a board cell target is required")),
    }
}

/// Validate the target and describe the active's effect. Usage gating
/// (phase, cooldown, once per turn) belongs to the caller.
pub fn resolve_active<R: Rng + ?Sized>(
    room: &Room,
    slot: Slot,
    target: Option<AbilityTarget>,
    rng: &mut R,
) -> Result<AbilityResolution, DomainError> {
    let player = room.player(slot).ok_or_else(|| {
        DomainError::validation(ValidationKind::InvalidSlot, format!("no player in slot {slot}"))
    })?;
    let cash = player.cash.max(0);

    match player.character {
        Character::Banker => {
            let gain = percent_of(cash, BANKER_RATE_PERCENT).min(BANKER_CAP);
            Ok(AbilityResolution::deltas(vec![StateDelta::Credit {
                slot,
                amount: gain,
                reason: MoneyReason::Ability,
            }]))
        }
        Character::Landlord => {
            let deltas = room
                .active_players()
                .filter(|p| p.slot != slot)
                .map(|p| StateDelta::Transfer {
                    from: p.slot,
                    to: slot,
                    amount: LANDLORD_DUES,
                    reason: MoneyReason::Ability,
                })
                .collect();
            Ok(AbilityResolution::deltas(deltas))
        }
        Character::Architect => {
            let cell = target_cell(target)?;
            economy::check_build_house(room, slot, cell)?;
            let houses = player.holdings.get(&cell).map_or(0, |h| h.houses);
            Ok(AbilityResolution::deltas(vec![StateDelta::SetBuilding {
                cell,
                houses: houses + 1,
                hotel: false,
            }]))
        }
        Character::Gambler => {
            let delta = if rng.random_bool(0.5) {
                StateDelta::Credit {
                    slot,
                    amount: GAMBLER_WIN,
                    reason: MoneyReason::Ability,
                }
            } else {
                StateDelta::Debit {
                    slot,
                    amount: GAMBLER_LOSS.min(cash),
                    reason: MoneyReason::Ability,
                }
            };
            Ok(AbilityResolution::deltas(vec![delta]))
        }
        Character::Traveler => {
            let cell = target_cell(target)?;
            if cell == GO_TO_ISLAND_CELL || cell == player.position {
                return Err(invalid_target("cannot jet to that cell"));
            }
            Ok(AbilityResolution {
                deltas: Vec::new(),
                follow_up: AbilityFollowUp::MoveTo { cell },
            })
        }
        Character::Merchant => {
            let cell = target_cell(target)?;
            let (owner, holding) = room
                .holding(cell)
                .filter(|(owner, _)| *owner != slot)
                .ok_or_else(|| invalid_target("cell must belong to an opponent"))?;
            if holding.hotel {
                return Err(invalid_target("hotels cannot be bought out"));
            }
            let price = economy::buyback_price(room, cell, slot);
            if player.cash < price {
                return Err(DomainError::validation(
                    ValidationKind::InsufficientFunds,
                    format!("hostile bid costs {price}"),
                ));
            }
            Ok(AbilityResolution::deltas(vec![
                StateDelta::Transfer {
                    from: slot,
                    to: owner,
                    amount: price,
                    reason: MoneyReason::Ability,
                },
                StateDelta::TransferCell {
                    from: owner,
                    to: slot,
                    cell,
                },
            ]))
        }
        Character::Diplomat => Ok(AbilityResolution::deltas(vec![StateDelta::SetBuff {
            slot,
            change: BuffChange::RentImmunity,
        }])),
        Character::Thief => {
            let victim = match target {
                Some(AbilityTarget::Opponent { slot: victim }) if victim != slot => room
                    .player(victim)
                    .filter(|p| p.is_active())
                    .ok_or_else(|| invalid_target("opponent is not in the game"))?,
                _ => return Err(invalid_target("an opponent target is required")),
            };
            let amount = percent_of(victim.cash.max(0), THIEF_RATE_PERCENT).min(THIEF_CAP);
            Ok(AbilityResolution::deltas(vec![StateDelta::Transfer {
                from: victim.slot,
                to: slot,
                amount,
                reason: MoneyReason::Ability,
            }]))
        }
        Character::Mayor => {
            let cell = target_cell(target)?;
            if !player.owns(cell) {
                return Err(DomainError::validation(
                    ValidationKind::NotOwner,
                    "festival decree needs an owned cell",
                ));
            }
            Ok(AbilityResolution::deltas(vec![StateDelta::ApplyFestival {
                slot,
                cell,
            }]))
        }
        Character::Pilot => match target {
            Some(AbilityTarget::Steps { steps }) if (1..=6).contains(&steps) => {
                Ok(AbilityResolution {
                    deltas: Vec::new(),
                    follow_up: AbilityFollowUp::MoveSteps { steps },
                })
            }
            _ => Err(invalid_target("step count must be 1..=6")),
        },
        Character::Saboteur => {
            let cell = target_cell(target)?;
            let (_, holding) = room
                .holding(cell)
                .filter(|(owner, h)| *owner != slot && !h.hotel && h.houses > 0)
                .ok_or_else(|| invalid_target("target must be an opponent cell with houses"))?;
            Ok(AbilityResolution::deltas(vec![StateDelta::SetBuilding {
                cell,
                houses: holding.houses - 1,
                hotel: false,
            }]))
        }
        Character::Magnate => {
            let owned = player.holdings.len() as Money;
            Ok(AbilityResolution::deltas(vec![StateDelta::Credit {
                slot,
                amount: owned * MAGNATE_PER_CELL,
                reason: MoneyReason::Ability,
            }]))
        }
        Character::Oracle => match target {
            Some(AbilityTarget::Deck { deck }) => Ok(AbilityResolution::deltas(vec![
                StateDelta::ReshuffleDeck { deck },
            ])),
            _ => Err(invalid_target("a deck must be chosen")),
        },
    }
}

/// True when the cell can receive a festival from its owner.
pub fn festival_target_ok(room: &Room, slot: Slot, cell: CellIndex) -> bool {
    board::is_ownable(cell) && room.player(slot).is_some_and(|p| p.owns(cell))
}
