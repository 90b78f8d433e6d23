use tracing::debug;

use super::insolvency::phase_mismatch;
use super::Flow;
use crate::domain::card_effects::{
    resolve_card, resolve_card_choice, CardFollowUp, CardResolution, CardTarget, ChoiceKind,
};
use crate::domain::cards::{draw_card, DeckKind};
use crate::domain::events::GameEvent;
use crate::domain::rules::Slot;
use crate::errors::domain::DomainError;

impl Flow<'_, '_> {
    /// Draw from `deck` and resolve the card. The card is shown to the room
    /// before the turn moves on.
    pub(super) fn draw_and_resolve(&mut self, slot: Slot, deck: DeckKind, depth: u8) -> Result<(), DomainError> {
        let round = self.room.round;
        let draw = draw_card(self.room.decks.get_mut(deck), deck, round, &mut *self.ctx.rng);
        let card = draw.card;
        debug!(
            room_id = %self.room.id,
            slot,
            deck = deck.as_str(),
            card = card.id,
            repaired = draw.repaired,
            "Card drawn"
        );
        self.emit(GameEvent::CardDrawn {
            slot,
            deck,
            card: card.id.to_string(),
            title: card.title.to_string(),
        });
        if draw.reshuffled {
            self.emit(GameEvent::DeckReshuffled { deck });
        }

        self.room.turn.pending_card_display = Some(card.id.to_string());
        self.room.turn.via_card = true;
        let resolution = resolve_card(self.room, slot, card, &mut *self.ctx.rng);
        let outcome = self.apply_card_resolution(slot, resolution, depth);
        self.room.turn.via_card = false;
        outcome
    }

    /// `chooseCardTarget` in one of the card choice phases.
    pub(super) fn choose_card_target(&mut self, target: CardTarget) -> Result<(), DomainError> {
        let kind = ChoiceKind::from_phase(&self.room.phase)
            .ok_or_else(|| phase_mismatch("no card choice is pending"))?;
        let slot = self.room.current_slot;
        let resolution = resolve_card_choice(self.room, slot, kind, target)?;
        self.room.turn.via_card = true;
        let outcome = self.apply_card_resolution(slot, resolution, 1);
        self.room.turn.via_card = false;
        outcome
    }

    fn apply_card_resolution(
        &mut self,
        slot: Slot,
        resolution: CardResolution,
        depth: u8,
    ) -> Result<(), DomainError> {
        self.apply_deltas(resolution.deltas)?;

        match resolution.follow_up {
            CardFollowUp::None => self.after_payment(),
            CardFollowUp::Move { to, collect_salary } => {
                if self.settle_insolvency()? {
                    return Ok(());
                }
                if collect_salary {
                    self.walk_to(slot, to)?;
                } else {
                    self.teleport(slot, to)?;
                }
                self.resolve_landing(slot, depth + 1)
            }
            CardFollowUp::SendToIsland => {
                self.room.turn.rolled_doubles = false;
                self.send_to_island(slot)?;
                self.finish_step()
            }
            CardFollowUp::Choice(kind) => self.await_phase(kind.phase()),
            CardFollowUp::ExtraTurn => {
                self.room.turn.extra_turn = true;
                self.after_payment()
            }
        }
    }
}
