//! Card effect resolution as pure state transforms.
//!
//! `resolve_card` never mutates the room. It returns money/board deltas plus a
//! follow-up the orchestrator acts on (movement, island, a choice phase, an
//! extra turn). Choice cards are resolved later by `resolve_card_choice` or,
//! on timeout, by `default_card_choice`.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::abilities::{apply_passive, PassiveHook};
use crate::domain::board::{
    self, nearest_forward, owns_full_group, GO_TO_ISLAND_CELL, GROUP_COUNT, STATIONS, UTILITIES,
};
use crate::domain::cards::{CardDef, CardEffect};
use crate::domain::deltas::{BuffChange, MoneyReason, StateDelta};
use crate::domain::economy::{self, free_upgrade_candidates, net_worth, Upgrade};
use crate::domain::phase::Phase;
use crate::domain::rules::{percent_of, CellIndex, Money, Slot, BOARD_SIZE, FREEZE_TURNS};
use crate::domain::state::Room;
use crate::errors::domain::{DomainError, ValidationKind};

/// Card effects that suspend the turn until the drawer picks a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceKind {
    Destination,
    Trade,
    Freeze,
    EminentDomain,
}

impl ChoiceKind {
    pub fn phase(&self) -> Phase {
        match self {
            ChoiceKind::Destination => Phase::AwaitingDestinationChoice,
            ChoiceKind::Trade => Phase::AwaitingTradeChoice,
            ChoiceKind::Freeze => Phase::AwaitingFreezeChoice,
            ChoiceKind::EminentDomain => Phase::AwaitingEminentDomainChoice,
        }
    }

    pub fn from_phase(phase: &Phase) -> Option<Self> {
        match phase {
            Phase::AwaitingDestinationChoice => Some(ChoiceKind::Destination),
            Phase::AwaitingTradeChoice => Some(ChoiceKind::Trade),
            Phase::AwaitingFreezeChoice => Some(ChoiceKind::Freeze),
            Phase::AwaitingEminentDomainChoice => Some(ChoiceKind::EminentDomain),
            _ => None,
        }
    }
}

/// Target submitted with `chooseCardTarget`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardTarget {
    Destination { cell: CellIndex },
    Trade { own_cell: CellIndex, their_cell: CellIndex },
    Freeze { cell: CellIndex },
    EminentDomain { cell: CellIndex },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFollowUp {
    None,
    /// Walk forward (or back, when `collect_salary` is false) to `to` and
    /// resolve the landing.
    Move { to: CellIndex, collect_salary: bool },
    SendToIsland,
    Choice(ChoiceKind),
    ExtraTurn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardResolution {
    pub deltas: Vec<StateDelta>,
    pub follow_up: CardFollowUp,
}

impl CardResolution {
    fn none() -> Self {
        Self::with(Vec::new())
    }

    fn with(deltas: Vec<StateDelta>) -> Self {
        Self {
            deltas,
            follow_up: CardFollowUp::None,
        }
    }

    fn follow(follow_up: CardFollowUp) -> Self {
        Self {
            deltas: Vec::new(),
            follow_up,
        }
    }
}

fn gain(room: &Room, slot: Slot, amount: Money) -> Money {
    apply_passive(room, slot, PassiveHook::CardMoneyGain, amount)
}

fn loss(room: &Room, slot: Slot, amount: Money) -> Money {
    apply_passive(room, slot, PassiveHook::CardMoneyLoss, amount)
}

fn credit(slot: Slot, amount: Money) -> Vec<StateDelta> {
    if amount <= 0 {
        return Vec::new();
    }
    vec![StateDelta::Credit {
        slot,
        amount,
        reason: MoneyReason::Card,
    }]
}

fn debit(slot: Slot, amount: Money) -> Vec<StateDelta> {
    if amount <= 0 {
        return Vec::new();
    }
    vec![StateDelta::Debit {
        slot,
        amount,
        reason: MoneyReason::Card,
    }]
}

fn opponents(room: &Room, drawer: Slot) -> impl Iterator<Item = Slot> + '_ {
    room.active_players()
        .filter(move |p| p.slot != drawer)
        .map(|p| p.slot)
}

/// Opponent-owned cells matching `keep`, in board order.
fn opponent_cells(
    room: &Room,
    drawer: Slot,
    keep: impl Fn(Slot, CellIndex) -> bool,
) -> Vec<(Slot, CellIndex)> {
    let mut cells: Vec<(Slot, CellIndex)> = room
        .active_players()
        .filter(|p| p.slot != drawer)
        .flat_map(|p| p.holdings.keys().map(move |&c| (p.slot, c)))
        .filter(|&(owner, cell)| keep(owner, cell))
        .collect();
    cells.sort_by_key(|&(_, cell)| cell);
    cells
}

fn bare(room: &Room, cell: CellIndex) -> bool {
    room.holding(cell).is_some_and(|(_, h)| !h.has_buildings())
}

fn no_hotel(room: &Room, cell: CellIndex) -> bool {
    room.holding(cell).is_some_and(|(_, h)| !h.hotel)
}

/// Active players ranked by net worth; `None` when fewer than two remain.
fn poorest_and_richest(room: &Room) -> Option<((Slot, Money), (Slot, Money))> {
    let worths: Vec<(Slot, Money)> = room
        .active_players()
        .map(|p| (p.slot, net_worth(p)))
        .collect();
    if worths.len() < 2 {
        return None;
    }
    let poorest = *worths
        .iter()
        .min_by_key(|&&(slot, worth)| (worth, slot))?;
    let richest = *worths
        .iter()
        .max_by_key(|&&(slot, worth)| (worth, std::cmp::Reverse(slot)))?;
    Some((poorest, richest))
}

/// Describe what drawing `card` does for `drawer`.
pub fn resolve_card<R: Rng + ?Sized>(
    room: &Room,
    drawer: Slot,
    card: &CardDef,
    rng: &mut R,
) -> CardResolution {
    let Some(player) = room.player(drawer) else {
        return CardResolution::none();
    };
    let position = player.position;
    if card.holdable {
        return CardResolution::with(vec![StateDelta::HoldCard {
            slot: drawer,
            card: card.id.to_string(),
        }]);
    }

    match card.effect {
        CardEffect::GainPoints { amount } => {
            CardResolution::with(credit(drawer, gain(room, drawer, amount)))
        }
        CardEffect::LosePoints { amount } => {
            CardResolution::with(debit(drawer, loss(room, drawer, amount)))
        }
        CardEffect::LosePercent { percent } => {
            let base = percent_of(player.cash.max(0), i64::from(percent));
            CardResolution::with(debit(drawer, loss(room, drawer, base)))
        }
        CardEffect::MoveTo { cell } => CardResolution::follow(CardFollowUp::Move {
            to: cell,
            collect_salary: true,
        }),
        CardEffect::MoveRelative { steps } => {
            let to = (i16::from(position) + i16::from(steps)).rem_euclid(i16::from(BOARD_SIZE));
            CardResolution::follow(CardFollowUp::Move {
                to: to as CellIndex,
                collect_salary: steps > 0,
            })
        }
        CardEffect::MoveToNearestStation => match nearest_forward(position, &STATIONS) {
            Some(to) => CardResolution::follow(CardFollowUp::Move {
                to,
                collect_salary: true,
            }),
            None => CardResolution::none(),
        },
        CardEffect::MoveToNearestUtility => match nearest_forward(position, &UTILITIES) {
            Some(to) => CardResolution::follow(CardFollowUp::Move {
                to,
                collect_salary: true,
            }),
            None => CardResolution::none(),
        },
        CardEffect::GainFromEach { amount } => {
            let amount = gain(room, drawer, amount);
            let deltas = opponents(room, drawer)
                .map(|from| StateDelta::Transfer {
                    from,
                    to: drawer,
                    amount,
                    reason: MoneyReason::Card,
                })
                .collect();
            CardResolution::with(deltas)
        }
        CardEffect::LoseToEach { amount } => {
            let amount = loss(room, drawer, amount);
            let deltas = opponents(room, drawer)
                .map(|to| StateDelta::Transfer {
                    from: drawer,
                    to,
                    amount,
                    reason: MoneyReason::Card,
                })
                .collect();
            CardResolution::with(deltas)
        }
        CardEffect::GoToIsland => CardResolution::follow(CardFollowUp::SendToIsland),
        CardEffect::SwapPosition => {
            let candidates: Vec<Slot> = room
                .active_players()
                .filter(|p| p.slot != drawer && !p.is_confined())
                .map(|p| p.slot)
                .collect();
            match candidates.choose(rng) {
                Some(&other) => CardResolution::with(vec![StateDelta::SwapPositions {
                    a: drawer,
                    b: other,
                }]),
                None => CardResolution::none(),
            }
        }
        CardEffect::StealProperty => {
            let cells = opponent_cells(room, drawer, |_, c| no_hotel(room, c));
            match cells.choose(rng) {
                Some(&(from, cell)) => CardResolution::with(vec![StateDelta::TransferCell {
                    from,
                    to: drawer,
                    cell,
                }]),
                None => CardResolution::none(),
            }
        }
        CardEffect::TeleportAll => {
            let ownable: Vec<CellIndex> = board::all_cells()
                .iter()
                .filter(|c| c.is_ownable())
                .map(|c| c.index)
                .collect();
            let deltas = room
                .active_players()
                .filter(|p| !p.is_confined())
                .filter_map(|p| {
                    ownable.choose(&mut *rng).map(|&cell| StateDelta::Teleport {
                        slot: p.slot,
                        cell,
                    })
                })
                .collect();
            CardResolution::with(deltas)
        }
        CardEffect::ChooseDestination => choice_if_possible(room, drawer, ChoiceKind::Destination),
        CardEffect::ForcedTrade => choice_if_possible(room, drawer, ChoiceKind::Trade),
        CardEffect::RentFreeze => choice_if_possible(room, drawer, ChoiceKind::Freeze),
        CardEffect::EminentDomain => choice_if_possible(room, drawer, ChoiceKind::EminentDomain),
        CardEffect::UnderdogBoost { amount } => {
            let Some(((poorest, worth), _)) = poorest_and_richest(room) else {
                return CardResolution::none();
            };
            let tied = room
                .active_players()
                .filter(|p| net_worth(p) == worth)
                .count()
                > 1;
            if tied {
                return CardResolution::none();
            }
            CardResolution::with(credit(poorest, gain(room, poorest, amount)))
        }
        CardEffect::WealthTransfer { amount } => {
            let Some(((poorest, _), (richest, _))) = poorest_and_richest(room) else {
                return CardResolution::none();
            };
            if poorest == richest {
                return CardResolution::none();
            }
            let cash = room.player(richest).map_or(0, |p| p.cash.max(0));
            let amount = amount.min(cash);
            if amount <= 0 {
                return CardResolution::none();
            }
            CardResolution::with(vec![StateDelta::Transfer {
                from: richest,
                to: poorest,
                amount,
                reason: MoneyReason::Card,
            }])
        }
        CardEffect::GainPerGroup { amount } => {
            let groups = (0..GROUP_COUNT)
                .filter(|&g| owns_full_group(g, |c| player.owns(c)))
                .count() as Money;
            CardResolution::with(credit(drawer, gain(room, drawer, groups * amount)))
        }
        CardEffect::GainPerProperty { amount } => {
            let owned = player.holdings.len() as Money;
            CardResolution::with(credit(drawer, gain(room, drawer, owned * amount)))
        }
        CardEffect::PayPerBuilding { house, hotel } => {
            let total: Money = player
                .holdings
                .values()
                .map(|h| Money::from(h.houses) * house + if h.hotel { hotel } else { 0 })
                .sum();
            CardResolution::with(debit(drawer, loss(room, drawer, total)))
        }
        CardEffect::ExtraTurn => CardResolution::follow(CardFollowUp::ExtraTurn),
        CardEffect::SkipNextTurn => CardResolution::with(vec![StateDelta::SetBuff {
            slot: drawer,
            change: BuffChange::SkipNextTurn,
        }]),
        // Only meaningful once held.
        CardEffect::EscapeIsland | CardEffect::RentShield => CardResolution::none(),
        CardEffect::DoubleRent { turns } => CardResolution::with(vec![StateDelta::SetBuff {
            slot: drawer,
            change: BuffChange::DoubleRent { turns },
        }]),
        CardEffect::BlockBuying { turns } => CardResolution::with(vec![StateDelta::SetBuff {
            slot: drawer,
            change: BuffChange::BlockBuying { turns },
        }]),
        CardEffect::DemolishBuilding => {
            let cells = opponent_cells(room, drawer, |_, c| {
                room.holding(c).is_some_and(|(_, h)| !h.hotel && h.houses > 0)
            });
            match cells.choose(rng).and_then(|&(_, c)| room.holding(c).map(|(_, h)| (c, h))) {
                Some((cell, holding)) => CardResolution::with(vec![StateDelta::SetBuilding {
                    cell,
                    houses: holding.houses - 1,
                    hotel: false,
                }]),
                None => CardResolution::none(),
            }
        }
        CardEffect::FreeUpgrade => {
            let candidates = free_upgrade_candidates(room, drawer);
            match candidates.choose(rng) {
                Some(&cell) => {
                    CardResolution::with(upgrade_delta(room, drawer, cell).into_iter().collect())
                }
                None => CardResolution::none(),
            }
        }
    }
}

/// Building delta for one free upgrade on `cell`, if the rules allow one.
pub fn upgrade_delta(room: &Room, slot: Slot, cell: CellIndex) -> Option<StateDelta> {
    let holding = room.holding(cell).map(|(_, h)| h)?;
    match economy::next_upgrade(room, slot, cell)? {
        Upgrade::House { .. } => Some(StateDelta::SetBuilding {
            cell,
            houses: holding.houses + 1,
            hotel: false,
        }),
        Upgrade::Hotel { .. } => Some(StateDelta::SetBuilding {
            cell,
            houses: 0,
            hotel: true,
        }),
    }
}

fn choice_if_possible(room: &Room, drawer: Slot, kind: ChoiceKind) -> CardResolution {
    if has_choice_targets(room, drawer, kind) {
        CardResolution::follow(CardFollowUp::Choice(kind))
    } else {
        CardResolution::none()
    }
}

fn trade_pairs(room: &Room, drawer: Slot) -> Vec<(CellIndex, CellIndex)> {
    let Some(player) = room.player(drawer) else {
        return Vec::new();
    };
    let theirs = opponent_cells(room, drawer, |_, c| bare(room, c));
    player
        .holdings
        .iter()
        .filter(|(_, h)| !h.has_buildings())
        .flat_map(|(&own, _)| theirs.iter().map(move |&(_, their)| (own, their)))
        .collect()
}

fn freeze_targets(room: &Room, drawer: Slot) -> Vec<CellIndex> {
    opponent_cells(room, drawer, |_, c| !room.is_frozen(c))
        .into_iter()
        .map(|(_, c)| c)
        .collect()
}

fn eminent_domain_targets(room: &Room, drawer: Slot) -> Vec<CellIndex> {
    let cash = room.player(drawer).map_or(0, |p| p.cash);
    opponent_cells(room, drawer, |_, c| no_hotel(room, c))
        .into_iter()
        .map(|(_, c)| c)
        .filter(|&c| economy::buyback_price(room, c, drawer) <= cash)
        .collect()
}

fn destination_ok(cell: CellIndex) -> bool {
    cell < BOARD_SIZE && cell != GO_TO_ISLAND_CELL
}

pub fn has_choice_targets(room: &Room, drawer: Slot, kind: ChoiceKind) -> bool {
    match kind {
        ChoiceKind::Destination => true,
        ChoiceKind::Trade => !trade_pairs(room, drawer).is_empty(),
        ChoiceKind::Freeze => !freeze_targets(room, drawer).is_empty(),
        ChoiceKind::EminentDomain => !eminent_domain_targets(room, drawer).is_empty(),
    }
}

fn invalid(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::InvalidTarget, detail)
}

/// Validate a submitted target for the pending choice and describe its effect.
pub fn resolve_card_choice(
    room: &Room,
    drawer: Slot,
    kind: ChoiceKind,
    target: CardTarget,
) -> Result<CardResolution, DomainError> {
    match (kind, target) {
        (ChoiceKind::Destination, CardTarget::Destination { cell }) => {
            if !destination_ok(cell) {
                return Err(invalid(format!("cannot travel to cell {cell}")));
            }
            Ok(CardResolution::follow(CardFollowUp::Move {
                to: cell,
                collect_salary: true,
            }))
        }
        (ChoiceKind::Trade, CardTarget::Trade { own_cell, their_cell }) => {
            if !trade_pairs(room, drawer).contains(&(own_cell, their_cell)) {
                return Err(invalid("both cells must be owned and free of buildings"));
            }
            let Some((other, _)) = room.holding(their_cell) else {
                return Err(invalid(format!("cell {their_cell} is unowned")));
            };
            Ok(CardResolution::with(vec![
                StateDelta::TransferCell {
                    from: drawer,
                    to: other,
                    cell: own_cell,
                },
                StateDelta::TransferCell {
                    from: other,
                    to: drawer,
                    cell: their_cell,
                },
            ]))
        }
        (ChoiceKind::Freeze, CardTarget::Freeze { cell }) => {
            if !freeze_targets(room, drawer).contains(&cell) {
                return Err(invalid(format!("cell {cell} cannot be frozen")));
            }
            Ok(CardResolution::with(vec![StateDelta::FreezeRent {
                cell,
                turns: FREEZE_TURNS,
            }]))
        }
        (ChoiceKind::EminentDomain, CardTarget::EminentDomain { cell }) => {
            if !eminent_domain_targets(room, drawer).contains(&cell) {
                return Err(invalid(format!("cell {cell} cannot be purchased")));
            }
            let Some((owner, _)) = room.holding(cell) else {
                return Err(invalid(format!("cell {cell} is unowned")));
            };
            let price = economy::buyback_price(room, cell, drawer);
            Ok(CardResolution::with(vec![
                StateDelta::Transfer {
                    from: drawer,
                    to: owner,
                    amount: price,
                    reason: MoneyReason::Card,
                },
                StateDelta::TransferCell {
                    from: owner,
                    to: drawer,
                    cell,
                },
            ]))
        }
        _ => Err(DomainError::validation(
            ValidationKind::InvalidSelection,
            "target does not match the pending card",
        )),
    }
}

/// Target applied when a choice phase times out. `None` when nothing is
/// eligible any more.
pub fn default_card_choice<R: Rng + ?Sized>(
    room: &Room,
    drawer: Slot,
    kind: ChoiceKind,
    rng: &mut R,
) -> Option<CardTarget> {
    match kind {
        ChoiceKind::Destination => {
            let cells: Vec<CellIndex> = (0..BOARD_SIZE).filter(|&c| destination_ok(c)).collect();
            cells
                .choose(rng)
                .map(|&cell| CardTarget::Destination { cell })
        }
        ChoiceKind::Trade => trade_pairs(room, drawer)
            .first()
            .map(|&(own_cell, their_cell)| CardTarget::Trade { own_cell, their_cell }),
        ChoiceKind::Freeze => freeze_targets(room, drawer)
            .first()
            .map(|&cell| CardTarget::Freeze { cell }),
        ChoiceKind::EminentDomain => eminent_domain_targets(room, drawer)
            .first()
            .map(|&cell| CardTarget::EminentDomain { cell }),
    }
}
