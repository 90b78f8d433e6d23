use super::Flow;
use crate::domain::abilities::{apply_passive, PassiveHook};
use crate::domain::board::{forward_distance, ISLAND_CELL};
use crate::domain::deltas::MoneyReason;
use crate::domain::dice::{advance, roll_for, DiceRoll};
use crate::domain::events::GameEvent;
use crate::domain::rules::{CellIndex, Slot, GO_SALARY, ISLAND_TURNS, MAX_CONSECUTIVE_DOUBLES};
use crate::errors::domain::DomainError;

impl Flow<'_, '_> {
    pub(super) fn roll(&mut self, slot: Slot) -> DiceRoll {
        let roll = roll_for(slot, self.ctx.overrides, self.ctx.dice);
        self.room.last_dice = Some(roll);
        self.emit(GameEvent::DiceRolled {
            slot,
            d1: roll.d1,
            d2: roll.d2,
            doubles: roll.is_double(),
        });
        roll
    }

    /// `rollDice`: move by the roll, or go to the island on the third
    /// consecutive double.
    pub(super) fn roll_dice(&mut self) -> Result<(), DomainError> {
        let slot = self.room.current_slot;
        let roll = self.roll(slot);

        let player = self.player_mut(slot)?;
        if roll.is_double() {
            player.buffs.consecutive_doubles += 1;
        } else {
            player.buffs.consecutive_doubles = 0;
        }
        if player.buffs.consecutive_doubles >= MAX_CONSECUTIVE_DOUBLES {
            self.room.turn.rolled_doubles = false;
            self.send_to_island(slot)?;
            return self.finish_step();
        }

        self.room.turn.rolled_doubles = roll.is_double();
        self.walk(slot, roll.total())?;
        self.resolve_landing(slot, 0)
    }

    /// Walk forward `steps` cells, paying the salary when passing GO.
    pub(super) fn walk(&mut self, slot: Slot, steps: u8) -> Result<(), DomainError> {
        let from = self.player(slot)?.position;
        let (to, passed_go) = advance(from, steps);
        self.player_mut(slot)?.position = to;
        self.emit(GameEvent::Moved {
            slot,
            from,
            to,
            passed_go,
        });
        if passed_go {
            self.pay_salary(slot)?;
        }
        Ok(())
    }

    /// Walk forward to `to` (a full lap when already there).
    pub(super) fn walk_to(&mut self, slot: Slot, to: CellIndex) -> Result<(), DomainError> {
        let from = self.player(slot)?.position;
        self.walk(slot, forward_distance(from, to))
    }

    /// Set a position directly; never pays the salary.
    pub(super) fn teleport(&mut self, slot: Slot, to: CellIndex) -> Result<(), DomainError> {
        let player = self.player_mut(slot)?;
        let from = player.position;
        player.position = to;
        self.emit(GameEvent::Moved {
            slot,
            from,
            to,
            passed_go: false,
        });
        Ok(())
    }

    pub(super) fn pay_salary(&mut self, slot: Slot) -> Result<(), DomainError> {
        let amount = apply_passive(self.room, slot, PassiveHook::GoSalary, GO_SALARY);
        self.credit(slot, amount, MoneyReason::Salary)
    }

    /// Confine on the island. The caller decides how the turn continues.
    pub(super) fn send_to_island(&mut self, slot: Slot) -> Result<(), DomainError> {
        self.teleport(slot, ISLAND_CELL)?;
        let player = self.player_mut(slot)?;
        player.island_turns = ISLAND_TURNS;
        player.buffs.consecutive_doubles = 0;
        self.emit(GameEvent::SentToIsland { slot });
        Ok(())
    }
}
