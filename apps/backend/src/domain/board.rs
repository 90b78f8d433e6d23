//! Static 36-cell board table and pure lookups over it.

use serde::{Deserialize, Serialize};

use crate::domain::rules::{
    CellIndex, Money, BOARD_SIZE, STATION_PRICE, UTILITY_PRICE,
};

pub type GroupId = u8;

pub const GO_CELL: CellIndex = 0;
pub const ISLAND_CELL: CellIndex = 9;
pub const FESTIVAL_CELL: CellIndex = 18;
pub const TRAVEL_CELL: CellIndex = 27;
pub const GO_TO_ISLAND_CELL: CellIndex = 31;
pub const STATIONS: [CellIndex; 2] = [5, 23];
pub const UTILITIES: [CellIndex; 2] = [11, 26];
pub const GROUP_COUNT: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellKind {
    Go,
    Property { group: GroupId },
    Station,
    Utility,
    Luck,
    Opportunity,
    Tax,
    Island,
    Festival,
    Travel,
    GoToIsland,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDef {
    pub index: CellIndex,
    pub name: &'static str,
    pub kind: CellKind,
}

impl CellDef {
    /// Property, station, or utility.
    pub fn is_ownable(&self) -> bool {
        matches!(
            self.kind,
            CellKind::Property { .. } | CellKind::Station | CellKind::Utility
        )
    }

    pub fn group(&self) -> Option<GroupId> {
        match self.kind {
            CellKind::Property { group } => Some(group),
            _ => None,
        }
    }
}

/// Economics shared by every property of a color group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupDef {
    pub price: Money,
    pub house_cost: Money,
    pub hotel_cost: Money,
    pub base_rent: Money,
    pub house_rents: [Money; 4],
    pub hotel_rent: Money,
}

const fn cell(index: CellIndex, name: &'static str, kind: CellKind) -> CellDef {
    CellDef { index, name, kind }
}

const fn prop(index: CellIndex, name: &'static str, group: GroupId) -> CellDef {
    cell(index, name, CellKind::Property { group })
}

static BOARD: [CellDef; BOARD_SIZE as usize] = [
    cell(0, "GO", CellKind::Go),
    prop(1, "Harbor Lane", 0),
    cell(2, "Luck", CellKind::Luck),
    prop(3, "Fisher Row", 0),
    prop(4, "Mill Street", 1),
    cell(5, "North Station", CellKind::Station),
    cell(6, "Tax Office", CellKind::Tax),
    cell(7, "Opportunity", CellKind::Opportunity),
    prop(8, "Tannery Yard", 1),
    cell(9, "Island", CellKind::Island),
    prop(10, "Orchard Road", 2),
    cell(11, "Power Plant", CellKind::Utility),
    prop(12, "Vine Court", 2),
    prop(13, "Cider Walk", 2),
    cell(14, "Luck", CellKind::Luck),
    prop(15, "Market Square", 3),
    prop(16, "Guild Hall", 3),
    prop(17, "Weavers Close", 3),
    cell(18, "Festival", CellKind::Festival),
    prop(19, "Theatre Row", 4),
    cell(20, "Opportunity", CellKind::Opportunity),
    prop(21, "Opera Place", 4),
    prop(22, "Gallery Mews", 4),
    cell(23, "South Station", CellKind::Station),
    prop(24, "Garden Terrace", 5),
    prop(25, "Rose Crescent", 5),
    cell(26, "Waterworks", CellKind::Utility),
    cell(27, "Travel", CellKind::Travel),
    prop(28, "Lily Gardens", 5),
    cell(29, "Luck", CellKind::Luck),
    prop(30, "Bank Street", 6),
    cell(31, "Go to Island", CellKind::GoToIsland),
    prop(32, "Exchange Place", 6),
    cell(33, "Opportunity", CellKind::Opportunity),
    prop(34, "Crown Heights", 7),
    prop(35, "Palace Avenue", 7),
];

const fn group(
    price: Money,
    house_cost: Money,
    hotel_cost: Money,
    base_rent: Money,
    house_rents: [Money; 4],
    hotel_rent: Money,
) -> GroupDef {
    GroupDef {
        price,
        house_cost,
        hotel_cost,
        base_rent,
        house_rents,
        hotel_rent,
    }
}

static GROUPS: [GroupDef; GROUP_COUNT as usize] = [
    group(600, 400, 1000, 40, [200, 600, 1200, 1800], 2500),
    group(800, 400, 1200, 60, [300, 900, 1600, 2200], 3000),
    group(1000, 600, 1600, 80, [400, 1100, 2000, 2800], 3600),
    group(1200, 600, 1800, 100, [500, 1400, 2400, 3200], 4200),
    group(1400, 800, 2200, 120, [600, 1700, 2800, 3800], 5000),
    group(1600, 800, 2400, 140, [700, 2000, 3200, 4400], 5800),
    group(1800, 1000, 2800, 160, [800, 2300, 3600, 5000], 6600),
    group(2000, 1000, 3000, 200, [1000, 2800, 4200, 5800], 7500),
];

static GROUP_MEMBERS: [&[CellIndex]; GROUP_COUNT as usize] = [
    &[1, 3],
    &[4, 8],
    &[10, 12, 13],
    &[15, 16, 17],
    &[19, 21, 22],
    &[24, 25, 28],
    &[30, 32],
    &[34, 35],
];

pub fn cell_at(index: CellIndex) -> Option<&'static CellDef> {
    BOARD.get(usize::from(index))
}

pub fn all_cells() -> &'static [CellDef] {
    &BOARD
}

pub fn group_def(group: GroupId) -> Option<&'static GroupDef> {
    GROUPS.get(usize::from(group))
}

/// Cells of a color group; empty for unknown groups.
pub fn group_members(group: GroupId) -> &'static [CellIndex] {
    GROUP_MEMBERS
        .get(usize::from(group))
        .copied()
        .unwrap_or(&[])
}

/// True when `owned` holds every cell of the group.
pub fn owns_full_group(group: GroupId, owned: impl Fn(CellIndex) -> bool) -> bool {
    let members = group_members(group);
    !members.is_empty() && members.iter().all(|&c| owned(c))
}

pub fn is_ownable(index: CellIndex) -> bool {
    cell_at(index).is_some_and(CellDef::is_ownable)
}

/// Purchase price before passives; `None` for cells that cannot be bought.
pub fn price_of(index: CellIndex) -> Option<Money> {
    match cell_at(index)?.kind {
        CellKind::Property { group } => group_def(group).map(|g| g.price),
        CellKind::Station => Some(STATION_PRICE),
        CellKind::Utility => Some(UTILITY_PRICE),
        _ => None,
    }
}

/// Property economics for a cell, if it is a property.
pub fn property_def(index: CellIndex) -> Option<&'static GroupDef> {
    cell_at(index)?.group().and_then(group_def)
}

/// First cell of `targets` reached moving forward from `from` (exclusive).
pub fn nearest_forward(from: CellIndex, targets: &[CellIndex]) -> Option<CellIndex> {
    targets
        .iter()
        .copied()
        .min_by_key(|&t| (u16::from(t) + u16::from(BOARD_SIZE) - u16::from(from) - 1) % u16::from(BOARD_SIZE))
}

/// Forward distance in steps from `from` to `to`; a full lap when equal.
pub fn forward_distance(from: CellIndex, to: CellIndex) -> u8 {
    let d = (u16::from(to) + u16::from(BOARD_SIZE) - u16::from(from)) % u16::from(BOARD_SIZE);
    if d == 0 {
        BOARD_SIZE
    } else {
        d as u8
    }
}
