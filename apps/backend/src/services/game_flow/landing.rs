use rand::Rng;
use tracing::trace;

use super::Flow;
use crate::domain::board::{cell_at, CellKind};
use crate::domain::cards::DeckKind;
use crate::domain::deltas::MoneyReason;
use crate::domain::economy::{can_build_in_group, free_upgrade_candidates, go_landing_bonus, tax_due};
use crate::domain::phase::Phase;
use crate::domain::rules::{CellIndex, Slot, FREE_BUILDING_CHANCE_PERCENT};
use crate::errors::domain::{DomainError, ValidationKind};

impl Flow<'_, '_> {
    /// Resolve whatever `slot` landed on. `depth` counts card-driven moves;
    /// a card cell reached through a card does not draw again.
    pub(super) fn resolve_landing(&mut self, slot: Slot, depth: u8) -> Result<(), DomainError> {
        let cell = self.player(slot)?.position;
        let def = cell_at(cell).ok_or_else(|| {
            DomainError::validation(ValidationKind::InvalidCell, format!("cell {cell} is off the board"))
        })?;
        trace!(room_id = %self.room.id, slot, cell, depth, "Resolving landing");

        match def.kind {
            CellKind::Go => self.go_landing(slot),
            CellKind::Property { .. } | CellKind::Station | CellKind::Utility => {
                self.land_on_ownable(slot, cell)
            }
            CellKind::Luck | CellKind::Opportunity if depth > 0 => self.finish_step(),
            CellKind::Luck => self.draw_and_resolve(slot, DeckKind::Luck, depth),
            CellKind::Opportunity => self.draw_and_resolve(slot, DeckKind::Opportunity, depth),
            CellKind::Tax => {
                let due = tax_due(self.room, slot);
                self.debit(slot, due, MoneyReason::Tax)?;
                self.after_payment()
            }
            CellKind::Island => self.finish_step(),
            CellKind::Festival => {
                let owns_any = self.player(slot)?.holdings.keys().next().is_some();
                if owns_any {
                    self.await_phase(Phase::AwaitingFestival)
                } else {
                    self.finish_step()
                }
            }
            CellKind::Travel => {
                self.player_mut(slot)?.buffs.pending_travel = true;
                self.finish_step()
            }
            CellKind::GoToIsland => {
                self.send_to_island(slot)?;
                self.finish_step()
            }
        }
    }

    fn land_on_ownable(&mut self, slot: Slot, cell: CellIndex) -> Result<(), DomainError> {
        match self.room.owner_of(cell) {
            None => {
                if self.player(slot)?.buffs.buying_blocked() {
                    self.finish_step()
                } else {
                    self.await_phase(Phase::AwaitingAction { cell })
                }
            }
            Some(owner) if owner == slot => self.offer_build(slot, cell),
            Some(owner) => self.charge_rent(slot, owner, cell),
        }
    }

    /// Enter the build window for `cell`'s group if any upgrade is affordable.
    pub(super) fn offer_build(&mut self, slot: Slot, cell: CellIndex) -> Result<(), DomainError> {
        let group = cell_at(cell).and_then(|d| d.group());
        match group {
            Some(g) if can_build_in_group(self.room, slot, g) => {
                self.await_phase(Phase::AwaitingBuild { cell })
            }
            _ => self.finish_step(),
        }
    }

    /// Landing exactly on GO: a chance of a free building when one is
    /// possible, otherwise a bonus that shrinks as rounds go by.
    fn go_landing(&mut self, slot: Slot) -> Result<(), DomainError> {
        let eligible = !free_upgrade_candidates(self.room, slot).is_empty();
        if eligible && self.ctx.rng.random_range(0..100) < FREE_BUILDING_CHANCE_PERCENT {
            return self.await_phase(Phase::AwaitingFreeBuilding);
        }
        let bonus = go_landing_bonus(self.room.round);
        self.credit(slot, bonus, MoneyReason::GoBonus)?;
        self.finish_step()
    }
}
