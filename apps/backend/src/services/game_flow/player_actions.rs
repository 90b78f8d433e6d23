use tracing::debug;

use super::Flow;
use crate::domain::actions::PlayerAction;
use crate::domain::events::GameEvent;
use crate::domain::rules::Slot;
use crate::domain::state::{EliminationReason, RoomStatus};
use crate::errors::domain::{DomainError, ValidationKind};

impl Flow<'_, '_> {
    /// Validate and apply one player action.
    ///
    /// In-turn actions require the acting slot to be the current player and
    /// the phase to permit the action kind. Negotiation and surrender are
    /// accepted from any non-eliminated player.
    pub fn act(&mut self, slot: Slot, action: PlayerAction) -> Result<(), DomainError> {
        if self.room.status != RoomStatus::Playing {
            return Err(DomainError::validation(
                ValidationKind::GameNotActive,
                format!("room is {}", self.room.status.as_str()),
            ));
        }
        if !self.player(slot)?.is_active() {
            return Err(DomainError::validation(
                ValidationKind::PlayerEliminated,
                format!("slot {slot} has been eliminated"),
            ));
        }

        if let Some(kind) = action.kind() {
            if slot != self.room.current_slot {
                return Err(DomainError::validation(
                    ValidationKind::OutOfTurn,
                    format!("it is slot {}'s turn", self.room.current_slot),
                ));
            }
            if !self.room.phase.permits(kind) {
                return Err(DomainError::validation(
                    ValidationKind::PhaseMismatch,
                    format!("{} is not allowed in {}", action.name(), self.room.phase.name()),
                ));
            }
        }

        debug!(
            room_id = %self.room.id,
            slot,
            action = action.name(),
            phase = self.room.phase.name(),
            "Applying action"
        );
        self.clear_afk(slot)?;

        match action {
            PlayerAction::RollDice => self.roll_dice(),
            PlayerAction::BuyProperty => self.buy_property(),
            PlayerAction::SkipBuy | PlayerAction::SkipBuild => self.finish_step(),
            PlayerAction::BuildHouse { cell } => self.build(cell, false),
            PlayerAction::BuildHotel { cell } => self.build(cell, true),
            PlayerAction::ChooseFreeBuilding { cell } => self.choose_free_building(cell),
            PlayerAction::TravelTo { cell } => self.travel_to(cell),
            PlayerAction::ApplyFestival { cell } => self.choose_festival(cell),
            PlayerAction::EscapeIsland { method } => self.escape_island(method),
            PlayerAction::RespondToBuyback { accept } => self.respond_to_buyback(accept),
            PlayerAction::SellAssets { selections } => self.sell_assets(&selections),
            PlayerAction::ChooseCardTarget { target } => self.choose_card_target(target),
            PlayerAction::UseActiveAbility { target } => self.use_active_ability(target),
            PlayerAction::SendNegotiationOffer { cell, price } => {
                self.send_negotiation_offer(slot, cell, price)
            }
            PlayerAction::RespondToNegotiation { accept } => {
                self.respond_to_negotiation(slot, accept)
            }
            PlayerAction::Surrender => self.eliminate(slot, EliminationReason::Surrendered),
        }
    }

    /// Any deliberate action resets the AFK counter.
    fn clear_afk(&mut self, slot: Slot) -> Result<(), DomainError> {
        let player = self.player_mut(slot)?;
        player.afk_strikes = 0;
        if player.afk {
            player.afk = false;
            self.emit(GameEvent::AfkChanged { slot, afk: false });
        }
        Ok(())
    }
}
