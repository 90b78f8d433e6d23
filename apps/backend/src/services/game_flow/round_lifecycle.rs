use tracing::info;

use super::Flow;
use crate::domain::economy::net_worth;
use crate::domain::events::GameEvent;
use crate::domain::phase::Phase;
use crate::domain::rules::Slot;
use crate::domain::state::{RoomStatus, TurnContext, WinReason, Winner};
use crate::errors::domain::DomainError;

impl Flow<'_, '_> {
    /// Enter a phase that waits on the current player.
    pub(super) fn await_phase(&mut self, phase: Phase) -> Result<(), DomainError> {
        let via_card = self.room.turn.via_card;
        self.room.set_phase(phase);
        self.room.phase_via_card = via_card;
        self.room.turn.pending_card_display = None;
        Ok(())
    }

    /// The current step is done: show a pending card, otherwise end the turn.
    pub(super) fn finish_step(&mut self) -> Result<(), DomainError> {
        if self.room.status != RoomStatus::Playing {
            return Ok(());
        }
        match self.room.turn.pending_card_display.take() {
            Some(card) => {
                self.room.set_phase(Phase::AwaitingCardDisplay { card });
                Ok(())
            }
            None => self.end_turn(),
        }
    }

    /// Grant the extra roll earned this turn, or pass the turn.
    pub(super) fn end_turn(&mut self) -> Result<(), DomainError> {
        if self.room.status != RoomStatus::Playing {
            return Ok(());
        }
        let slot = self.room.current_slot;
        let player = self.player(slot)?;
        let turn = &self.room.turn;
        let extra = player.is_active()
            && !player.is_confined()
            && (turn.extra_turn || (turn.rolled_doubles && !player.buffs.skip_next_turn));

        if extra {
            self.room.turn = TurnContext::default();
            self.emit(GameEvent::ExtraTurn { slot });
            self.room.set_phase(Phase::RollDice);
            return Ok(());
        }
        self.advance_turn()
    }

    /// Pass the turn to the next active slot, running start-of-turn upkeep.
    pub(super) fn advance_turn(&mut self) -> Result<(), DomainError> {
        if self.check_game_end() {
            return Ok(());
        }
        let previous = self.room.current_slot;
        if let Some(p) = self.room.player_mut(previous) {
            p.buffs.consecutive_doubles = 0;
            p.buffs.buying_blocked_now = false;
        }
        self.room.turn = TurnContext::default();
        self.tick_frozen_rent();

        let active = self.room.active_slots();
        let mut from = previous;
        // Every skip clears its flag, so two laps always find a player.
        for _ in 0..active.len() * 2 + 1 {
            let next = next_slot_after(&active, from);
            if next <= from {
                self.room.round += 1;
                if self.room.settings.max_rounds.is_some_and(|cap| self.room.round > cap) {
                    self.finish_by_round_cap();
                    return Ok(());
                }
            }
            from = next;

            let player = self.player_mut(next)?;
            player.buffs.double_rent_turns = player.buffs.double_rent_turns.saturating_sub(1);
            player.buffs.buying_blocked_now = player.buffs.buy_blocked_turns > 0;
            player.buffs.buy_blocked_turns = player.buffs.buy_blocked_turns.saturating_sub(1);
            player.ability.cooldown = player.ability.cooldown.saturating_sub(1);
            player.ability.used_this_turn = false;
            if player.buffs.skip_next_turn {
                player.buffs.skip_next_turn = false;
                player.buffs.buying_blocked_now = false;
                self.emit(GameEvent::TurnSkipped { slot: next });
                continue;
            }

            let phase = if player.is_confined() {
                Phase::IslandTurn
            } else if player.buffs.pending_travel {
                Phase::AwaitingTravel
            } else {
                Phase::RollDice
            };
            self.room.current_slot = next;
            self.room.set_phase(phase);
            return Ok(());
        }
        Ok(())
    }

    fn tick_frozen_rent(&mut self) {
        for entry in &mut self.room.frozen_rent {
            entry.remaining_turns = entry.remaining_turns.saturating_sub(1);
        }
        self.room.frozen_rent.retain(|f| f.remaining_turns > 0);
    }

    /// Finish the room when at most one player is left. Returns true when
    /// the room is (now) over.
    pub(super) fn check_game_end(&mut self) -> bool {
        if self.room.status != RoomStatus::Playing {
            return true;
        }
        let active = self.room.active_slots();
        if active.len() > 1 {
            return false;
        }
        let winner = active.first().and_then(|&slot| {
            self.room.player(slot).map(|p| Winner {
                slot,
                net_worth: net_worth(p),
                reason: WinReason::LastStanding,
            })
        });
        self.finish(winner);
        true
    }

    fn finish_by_round_cap(&mut self) {
        let winner = self
            .room
            .active_players()
            .map(|p| (p.slot, net_worth(p)))
            .max_by_key(|&(slot, worth)| (worth, std::cmp::Reverse(slot)))
            .map(|(slot, net_worth)| Winner {
                slot,
                net_worth,
                reason: WinReason::RoundCap,
            });
        self.finish(winner);
    }

    fn finish(&mut self, winner: Option<Winner>) {
        info!(
            room_id = %self.room.id,
            winner = ?winner.map(|w| w.slot),
            round = self.room.round,
            "Game finished"
        );
        self.room.winner = winner;
        self.room.status = RoomStatus::Finished;
        self.room.negotiation = None;
        self.room.turn = TurnContext::default();
        self.room.set_phase(Phase::GameOver);
    }

    /// Push the turn forward no matter what phase it is stuck in.
    pub fn force_end_turn(&mut self) -> Result<(), DomainError> {
        if self.room.status != RoomStatus::Playing {
            return Ok(());
        }
        let slot = self.room.current_slot;
        self.emit(GameEvent::TurnForced { slot });
        self.room.set_phase(Phase::EndTurn);
        if self.room.player(slot).is_some_and(|p| p.is_active() && p.cash < 0) {
            return self.bankrupt(slot);
        }
        self.advance_turn()
    }
}

/// Lowest active slot above `from`, wrapping to the lowest overall.
fn next_slot_after(active: &[Slot], from: Slot) -> Slot {
    active
        .iter()
        .copied()
        .find(|&s| s > from)
        .or_else(|| active.first().copied())
        .unwrap_or(from)
}
