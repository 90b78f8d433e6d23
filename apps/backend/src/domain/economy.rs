//! Rent, building rules, valuations, and other pure money arithmetic.
//!
//! Passive modifiers that belong to the *asker* (build cost, sell value,
//! buyback price, tax) are folded in here. Rent passives depend on who pays
//! and who collects, so the orchestrator applies those.

use serde::Serialize;

use crate::domain::abilities::{apply_passive, PassiveHook};
use crate::domain::board::{
    self, cell_at, group_def, group_members, owns_full_group, CellKind, GroupId,
};
use crate::domain::rules::{
    percent_of, percent_of_ceil, round_decayed, round_scaled, CellIndex, Money, Slot,
    BUYBACK_PERCENT, GO_LANDING_BONUS, MAX_HOUSES, STATION_BASE_RENT, TAX_MINIMUM, TAX_PERCENT,
    UTILITY_BASE_RENT,
};
use crate::domain::state::{Holding, Player, Room};
use crate::errors::domain::{DomainError, ValidationKind};

pub fn station_rent(stations_owned: usize, round: u32) -> Money {
    round_scaled(STATION_BASE_RENT * stations_owned as Money, round)
}

pub fn utility_rent(utilities_owned: usize, round: u32) -> Money {
    round_scaled(UTILITY_BASE_RENT * utilities_owned as Money, round)
}

fn count_owned(player: &Player, kind: CellKind) -> usize {
    player
        .holdings
        .keys()
        .filter(|&&c| cell_at(c).is_some_and(|d| d.kind == kind))
        .count()
}

/// Rent `payer` owes for landing on `cell`, before rent passives.
pub fn calculate_rent(room: &Room, cell: CellIndex, payer: Slot) -> Money {
    let Some(def) = cell_at(cell) else {
        return 0;
    };
    let Some((owner_slot, holding)) = room.holding(cell) else {
        return 0;
    };
    if owner_slot == payer || room.is_frozen(cell) {
        return 0;
    }
    let Some(owner) = room.player(owner_slot).filter(|p| p.is_active()) else {
        return 0;
    };

    let mut rent = match def.kind {
        CellKind::Property { group } => {
            let Some(g) = group_def(group) else {
                return 0;
            };
            if holding.hotel {
                g.hotel_rent
            } else if holding.houses > 0 {
                g.house_rents[usize::from(holding.houses.min(MAX_HOUSES)) - 1]
            } else if owns_full_group(group, |c| owner.owns(c)) {
                g.base_rent * 2
            } else {
                g.base_rent
            }
        }
        CellKind::Station => station_rent(count_owned(owner, CellKind::Station), room.round),
        CellKind::Utility => utility_rent(count_owned(owner, CellKind::Utility), room.round),
        _ => return 0,
    };

    if owner.buffs.double_rent_turns > 0 {
        rent *= 2;
    }
    if let Some(f) = room.festival {
        if f.cell == cell && f.owner == owner_slot {
            rent *= Money::from(f.multiplier);
        }
    }
    rent
}

fn owned_property<'a>(
    room: &'a Room,
    slot: Slot,
    cell: CellIndex,
) -> Result<(&'a Player, Holding, GroupId), DomainError> {
    let player = room.player(slot).ok_or_else(|| {
        DomainError::validation(ValidationKind::InvalidSlot, format!("no player in slot {slot}"))
    })?;
    let holding = *player.holdings.get(&cell).ok_or_else(|| {
        DomainError::validation(ValidationKind::NotOwner, format!("cell {cell} is not yours"))
    })?;
    let group = cell_at(cell).and_then(|d| d.group()).ok_or_else(|| {
        DomainError::validation(
            ValidationKind::InvalidCell,
            format!("cell {cell} cannot take buildings"),
        )
    })?;
    if !owns_full_group(group, |c| player.owns(c)) {
        return Err(DomainError::validation(
            ValidationKind::GroupIncomplete,
            format!("group {group} is not complete"),
        ));
    }
    Ok((player, holding, group))
}

/// Rule check for one more house on `cell`. Returns the base house cost.
pub fn check_build_house(room: &Room, slot: Slot, cell: CellIndex) -> Result<Money, DomainError> {
    let (player, holding, group) = owned_property(room, slot, cell)?;
    if holding.hotel {
        return Err(DomainError::validation(
            ValidationKind::HotelExists,
            format!("cell {cell} already has a hotel"),
        ));
    }
    if holding.houses >= MAX_HOUSES {
        return Err(DomainError::validation(
            ValidationKind::MaxHouses,
            format!("cell {cell} already has {MAX_HOUSES} houses"),
        ));
    }
    ensure_even(player, group, cell, holding.houses)?;
    Ok(group_def(group).map_or(0, |g| g.house_cost))
}

/// Rule check for converting four houses on `cell` into a hotel.
pub fn check_build_hotel(room: &Room, slot: Slot, cell: CellIndex) -> Result<Money, DomainError> {
    let (player, holding, group) = owned_property(room, slot, cell)?;
    if holding.hotel {
        return Err(DomainError::validation(
            ValidationKind::HotelExists,
            format!("cell {cell} already has a hotel"),
        ));
    }
    if holding.houses != MAX_HOUSES {
        return Err(DomainError::validation(
            ValidationKind::HotelRequiresFourHouses,
            format!("cell {cell} has {} houses", holding.houses),
        ));
    }
    ensure_even(player, group, cell, holding.houses)?;
    Ok(group_def(group).map_or(0, |g| g.hotel_cost))
}

fn ensure_even(player: &Player, group: GroupId, cell: CellIndex, current: u8) -> Result<(), DomainError> {
    let behind = group_members(group).iter().find(|&&sibling| {
        sibling != cell
            && player
                .holdings
                .get(&sibling)
                .map_or(0, Holding::level)
                < current
    });
    match behind {
        Some(sibling) => Err(DomainError::validation(
            ValidationKind::EvenBuild,
            format!("cell {sibling} must be built up before cell {cell}"),
        )),
        None => Ok(()),
    }
}

pub fn build_cost(room: &Room, slot: Slot, base: Money) -> Money {
    apply_passive(room, slot, PassiveHook::BuildCost, base)
}

/// Next upgrade available on a cell, by rules alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upgrade {
    House { cost: Money },
    Hotel { cost: Money },
}

impl Upgrade {
    pub fn cost(&self) -> Money {
        match *self {
            Upgrade::House { cost } | Upgrade::Hotel { cost } => cost,
        }
    }
}

/// Upgrade allowed on `cell`, with cost after the build-cost passive.
pub fn next_upgrade(room: &Room, slot: Slot, cell: CellIndex) -> Option<Upgrade> {
    if let Ok(base) = check_build_house(room, slot, cell) {
        return Some(Upgrade::House {
            cost: build_cost(room, slot, base),
        });
    }
    check_build_hotel(room, slot, cell)
        .ok()
        .map(|base| Upgrade::Hotel {
            cost: build_cost(room, slot, base),
        })
}

/// Owned cells that can take a building right now, ignoring cash.
pub fn free_upgrade_candidates(room: &Room, slot: Slot) -> Vec<CellIndex> {
    room.player(slot)
        .map(|p| {
            p.holdings
                .keys()
                .copied()
                .filter(|&c| next_upgrade(room, slot, c).is_some())
                .collect()
        })
        .unwrap_or_default()
}

/// Whether `slot` can afford at least one upgrade in `group`.
pub fn can_build_in_group(room: &Room, slot: Slot, group: GroupId) -> bool {
    let Some(cash) = room.player(slot).map(|p| p.cash) else {
        return false;
    };
    group_members(group)
        .iter()
        .filter_map(|&c| next_upgrade(room, slot, c))
        .any(|u| u.cost() <= cash)
}

/// Full value of a holding: price plus buildings.
pub fn holding_value(cell: CellIndex, holding: &Holding) -> Money {
    let price = board::price_of(cell).unwrap_or(0);
    match board::property_def(cell) {
        Some(g) => {
            let hotel = if holding.hotel { g.hotel_cost } else { 0 };
            price + Money::from(holding.houses) * g.house_cost + hotel
        }
        None => price,
    }
}

pub fn net_worth(player: &Player) -> Money {
    player.cash
        + player
            .holdings
            .iter()
            .map(|(&c, h)| holding_value(c, h))
            .sum::<Money>()
}

/// One row of the sell price table sent with the sell phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SellPrice {
    pub cell: CellIndex,
    pub land: Money,
    pub house: Money,
    pub hotel: Money,
    pub houses: u8,
    pub has_hotel: bool,
    /// Everything on the cell, land included.
    pub total: Money,
}

pub fn sell_price(room: &Room, slot: Slot, cell: CellIndex, holding: &Holding) -> SellPrice {
    let adjust = |v: Money| apply_passive(room, slot, PassiveHook::SellValue, v);
    let land = adjust(board::price_of(cell).unwrap_or(0));
    let (house, hotel) = board::property_def(cell)
        .map(|g| (adjust(g.house_cost), adjust(g.hotel_cost)))
        .unwrap_or((0, 0));
    let total = land
        + Money::from(holding.houses) * house
        + if holding.hotel { hotel } else { 0 };
    SellPrice {
        cell,
        land,
        house,
        hotel,
        houses: holding.houses,
        has_hotel: holding.hotel,
        total,
    }
}

pub fn sell_price_table(room: &Room, slot: Slot) -> Vec<SellPrice> {
    room.player(slot)
        .map(|p| {
            p.holdings
                .iter()
                .map(|(&c, h)| sell_price(room, slot, c, h))
                .collect()
        })
        .unwrap_or_default()
}

/// What liquidating everything would raise, sell passive included.
pub fn sellable_value(room: &Room, slot: Slot) -> Money {
    sell_price_table(room, slot).iter().map(|s| s.total).sum()
}

/// Market value used for buybacks. Stations and utilities are valued by
/// their current rent curve.
pub fn asset_value(room: &Room, cell: CellIndex) -> Money {
    let Some((owner, holding)) = room.holding(cell) else {
        return board::price_of(cell).unwrap_or(0);
    };
    let count = |kind| room.player(owner).map_or(0, |p| count_owned(p, kind));
    match cell_at(cell).map(|d| d.kind) {
        Some(CellKind::Station) => station_rent(count(CellKind::Station), room.round),
        Some(CellKind::Utility) => utility_rent(count(CellKind::Utility), room.round),
        _ => holding_value(cell, &holding),
    }
}

/// `ceil(1.1 × assetValue)`, then the buyer's buyback passive.
pub fn buyback_price(room: &Room, cell: CellIndex, buyer: Slot) -> Money {
    let base = percent_of_ceil(asset_value(room, cell), BUYBACK_PERCENT);
    apply_passive(room, buyer, PassiveHook::BuybackPrice, base)
}

pub fn purchase_price(room: &Room, slot: Slot, cell: CellIndex) -> Option<Money> {
    board::price_of(cell).map(|p| apply_passive(room, slot, PassiveHook::PurchasePrice, p))
}

/// `max(500, 10% of net worth)`, then the tax passive.
pub fn tax_due(room: &Room, slot: Slot) -> Money {
    let worth = room.player(slot).map_or(0, net_worth);
    let base = percent_of(worth.max(0), TAX_PERCENT).max(TAX_MINIMUM);
    apply_passive(room, slot, PassiveHook::TaxPaid, base)
}

/// Currency granted for landing exactly on GO.
pub fn go_landing_bonus(round: u32) -> Money {
    round_decayed(GO_LANDING_BONUS, round)
}

