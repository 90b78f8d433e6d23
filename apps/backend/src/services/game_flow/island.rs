use tracing::debug;

use super::Flow;
use crate::domain::abilities::{apply_passive, PassiveHook};
use crate::domain::actions::EscapeMethod;
use crate::domain::cards::CardEffect;
use crate::domain::deltas::MoneyReason;
use crate::domain::events::GameEvent;
use crate::domain::phase::Phase;
use crate::domain::rules::{Money, Slot, ISLAND_FEE};
use crate::errors::domain::{DomainError, ValidationKind};

impl Flow<'_, '_> {
    /// `escapeIsland`. Paying or using a card frees the player to roll
    /// normally; rolling doubles frees and moves them at once. The last
    /// failed roll forces the fee and still moves the player, after any
    /// liquidation the fee made necessary.
    pub(super) fn escape_island(&mut self, method: EscapeMethod) -> Result<(), DomainError> {
        let slot = self.room.current_slot;
        match method {
            EscapeMethod::Pay => {
                let fee = self.island_fee(slot);
                if self.player(slot)?.cash < fee {
                    return Err(DomainError::validation(
                        ValidationKind::InsufficientFunds,
                        format!("the island fee is {fee}"),
                    ));
                }
                self.debit(slot, fee, MoneyReason::IslandFee)?;
                self.release(slot, method)?;
                self.room.set_phase(Phase::RollDice);
                Ok(())
            }
            EscapeMethod::Card => {
                let card = self
                    .held_card_with(slot, CardEffect::EscapeIsland)
                    .ok_or_else(|| {
                        DomainError::validation(ValidationKind::NoEscapeCard, "no escape card held")
                    })?;
                self.player_mut(slot)?.take_card(&card);
                self.emit(GameEvent::CardUsed { slot, card });
                self.release(slot, method)?;
                self.room.set_phase(Phase::RollDice);
                Ok(())
            }
            EscapeMethod::Roll => self.island_roll(slot),
        }
    }

    fn island_roll(&mut self, slot: Slot) -> Result<(), DomainError> {
        let roll = self.roll(slot);
        self.room.turn.rolled_doubles = false;

        if roll.is_double() {
            self.release(slot, EscapeMethod::Roll)?;
            self.walk(slot, roll.total())?;
            return self.resolve_landing(slot, 0);
        }

        let player = self.player_mut(slot)?;
        player.island_turns = player.island_turns.saturating_sub(1);
        let turns_left = player.island_turns;
        if turns_left > 0 {
            self.emit(GameEvent::IslandAttemptFailed { slot, turns_left });
            return self.finish_step();
        }

        // Out of attempts: the fee is forced, even into debt.
        let fee = self.island_fee(slot);
        debug!(room_id = %self.room.id, slot, fee, "Island fee forced");
        self.debit(slot, fee, MoneyReason::IslandFee)?;
        self.emit(GameEvent::IslandEscaped {
            slot,
            method: EscapeMethod::Pay,
        });
        if self.settle_insolvency()? {
            if self.room.phase == Phase::AwaitingSell {
                self.room.turn.pending_walk = Some(roll.total());
            }
            return Ok(());
        }
        self.walk(slot, roll.total())?;
        self.resolve_landing(slot, 0)
    }

    fn release(&mut self, slot: Slot, method: EscapeMethod) -> Result<(), DomainError> {
        self.player_mut(slot)?.island_turns = 0;
        self.emit(GameEvent::IslandEscaped { slot, method });
        Ok(())
    }

    fn island_fee(&self, slot: Slot) -> Money {
        apply_passive(self.room, slot, PassiveHook::IslandFee, ISLAND_FEE)
    }
}
