use super::insolvency::phase_mismatch;
use super::Flow;
use crate::domain::abilities::festival_target_ok;
use crate::domain::board::{cell_at, GO_TO_ISLAND_CELL, TRAVEL_CELL};
use crate::domain::card_effects::upgrade_delta;
use crate::domain::deltas::{MoneyReason, StateDelta};
use crate::domain::economy::{
    build_cost, can_build_in_group, check_build_hotel, check_build_house, free_upgrade_candidates,
    purchase_price,
};
use crate::domain::events::GameEvent;
use crate::domain::phase::Phase;
use crate::domain::rules::{CellIndex, BOARD_SIZE};
use crate::errors::domain::{DomainError, ValidationKind};

impl Flow<'_, '_> {
    /// `buyProperty` on the cell the current player is standing on.
    pub(super) fn buy_property(&mut self) -> Result<(), DomainError> {
        let Phase::AwaitingAction { cell } = self.room.phase else {
            return Err(phase_mismatch("no purchase is pending"));
        };
        let slot = self.room.current_slot;
        let player = self.player(slot)?;
        if player.buffs.buying_blocked() {
            return Err(DomainError::validation(
                ValidationKind::BuyBlocked,
                "buying is blocked this turn",
            ));
        }
        if self.room.owner_of(cell).is_some() {
            return Err(DomainError::validation(
                ValidationKind::AlreadyOwned,
                format!("cell {cell} is already owned"),
            ));
        }
        let price = purchase_price(self.room, slot, cell).ok_or_else(|| {
            DomainError::validation(ValidationKind::NotBuyable, format!("cell {cell} cannot be bought"))
        })?;
        if player.cash < price {
            return Err(DomainError::validation(
                ValidationKind::InsufficientFunds,
                format!("cell {cell} costs {price}"),
            ));
        }

        self.debit(slot, price, MoneyReason::Purchase)?;
        self.player_mut(slot)?.holdings.insert(cell, Default::default());
        self.emit(GameEvent::PropertyBought { slot, cell, price });
        self.note_group_completion(slot, cell);
        self.offer_build(slot, cell)
    }

    /// `buildHouse` / `buildHotel` inside the build window. The window stays
    /// open while something in the group is still affordable.
    pub(super) fn build(&mut self, cell: CellIndex, hotel: bool) -> Result<(), DomainError> {
        let Phase::AwaitingBuild { cell: landed } = self.room.phase else {
            return Err(phase_mismatch("no build window is open"));
        };
        let slot = self.room.current_slot;
        let group = cell_at(landed).and_then(|d| d.group());
        if group.is_none() || cell_at(cell).and_then(|d| d.group()) != group {
            return Err(DomainError::validation(
                ValidationKind::NotInBuildGroup,
                format!("cell {cell} is not in the group of cell {landed}"),
            ));
        }

        let base = if hotel {
            check_build_hotel(self.room, slot, cell)?
        } else {
            check_build_house(self.room, slot, cell)?
        };
        let cost = build_cost(self.room, slot, base);
        if self.player(slot)?.cash < cost {
            return Err(DomainError::validation(
                ValidationKind::InsufficientFunds,
                format!("building on cell {cell} costs {cost}"),
            ));
        }
        let houses = self.player(slot)?.holdings.get(&cell).map_or(0, |h| h.houses);

        self.debit(slot, cost, MoneyReason::Build)?;
        let delta = if hotel {
            StateDelta::SetBuilding {
                cell,
                houses: 0,
                hotel: true,
            }
        } else {
            StateDelta::SetBuilding {
                cell,
                houses: houses + 1,
                hotel: false,
            }
        };
        self.apply_deltas(vec![delta])?;

        match group {
            Some(g) if can_build_in_group(self.room, slot, g) => {
                self.room.set_phase(Phase::AwaitingBuild { cell: landed });
                Ok(())
            }
            _ => self.finish_step(),
        }
    }

    pub(super) fn choose_free_building(&mut self, cell: CellIndex) -> Result<(), DomainError> {
        let slot = self.room.current_slot;
        if !free_upgrade_candidates(self.room, slot).contains(&cell) {
            return Err(DomainError::validation(
                ValidationKind::InvalidSelection,
                format!("cell {cell} cannot take a free building"),
            ));
        }
        if let Some(delta) = upgrade_delta(self.room, slot, cell) {
            self.apply_deltas(vec![delta])?;
        }
        self.finish_step()
    }

    /// `travelTo`: walk to any cell except the travel cell itself and the
    /// go-to-island corner.
    pub(super) fn travel_to(&mut self, cell: CellIndex) -> Result<(), DomainError> {
        if !travel_target_ok(cell) {
            return Err(DomainError::validation(
                ValidationKind::InvalidCell,
                format!("cannot travel to cell {cell}"),
            ));
        }
        let slot = self.room.current_slot;
        self.player_mut(slot)?.buffs.pending_travel = false;
        self.walk_to(slot, cell)?;
        self.resolve_landing(slot, 0)
    }

    /// `applyFestival` on one of the current player's cells.
    pub(super) fn choose_festival(&mut self, cell: CellIndex) -> Result<(), DomainError> {
        let slot = self.room.current_slot;
        if !festival_target_ok(self.room, slot, cell) {
            return Err(DomainError::validation(
                ValidationKind::NotOwner,
                format!("cell {cell} is not yours"),
            ));
        }
        self.apply_festival(slot, cell)?;
        self.finish_step()
    }
}

pub(super) fn travel_target_ok(cell: CellIndex) -> bool {
    cell < BOARD_SIZE && cell != TRAVEL_CELL && cell != GO_TO_ISLAND_CELL
}
