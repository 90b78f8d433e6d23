use tracing::info;

use super::Flow;
use crate::domain::abilities::{resolve_active, AbilityFollowUp, AbilityTarget};
use crate::domain::events::GameEvent;
use crate::domain::rules::Slot;
use crate::errors::domain::{DomainError, ValidationKind};

impl Flow<'_, '_> {
    /// `useActiveAbility` from the roll phase. Movement actives replace the
    /// roll; everything else leaves the player free to roll afterwards.
    pub(super) fn use_active_ability(&mut self, target: Option<AbilityTarget>) -> Result<(), DomainError> {
        if !self.room.settings.abilities_enabled {
            return Err(DomainError::validation(
                ValidationKind::AbilitiesDisabled,
                "abilities are disabled in this room",
            ));
        }
        let slot = self.room.current_slot;
        let player = self.player(slot)?;
        if player.ability.used_this_turn {
            return Err(DomainError::validation(
                ValidationKind::AbilityAlreadyUsed,
                "ability already used this turn",
            ));
        }
        if player.ability.cooldown > 0 {
            return Err(DomainError::validation(
                ValidationKind::AbilityOnCooldown,
                format!("{} turn(s) of cooldown left", player.ability.cooldown),
            ));
        }
        let character = player.character;
        let def = character.active();

        let resolution = resolve_active(self.room, slot, target, &mut *self.ctx.rng)?;
        self.apply_deltas(resolution.deltas)?;
        let player = self.player_mut(slot)?;
        player.ability.cooldown = def.cooldown;
        player.ability.used_this_turn = true;
        info!(room_id = %self.room.id, slot, ability = def.name, "Ability used");
        self.emit(GameEvent::AbilityUsed {
            slot,
            character,
            name: def.name.to_string(),
        });

        match resolution.follow_up {
            AbilityFollowUp::MoveTo { cell } => {
                self.room.turn.rolled_doubles = false;
                self.teleport(slot, cell)?;
                self.resolve_landing(slot, 0)
            }
            AbilityFollowUp::MoveSteps { steps } => {
                self.room.turn.rolled_doubles = false;
                self.walk(slot, steps)?;
                self.resolve_landing(slot, 0)
            }
            AbilityFollowUp::None => self.settle_opponent_debts(slot),
        }
    }

    /// Opponents pushed into debt by an active go bankrupt; the user stays in
    /// the roll phase.
    fn settle_opponent_debts(&mut self, user: Slot) -> Result<(), DomainError> {
        let debtors: Vec<Slot> = self
            .room
            .active_players()
            .filter(|p| p.slot != user && p.cash < 0)
            .map(|p| p.slot)
            .collect();
        for slot in debtors {
            self.bankrupt(slot)?;
        }
        Ok(())
    }
}
