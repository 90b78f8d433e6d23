use std::time::Duration;

use tracing::{debug, info};

use super::property::travel_target_ok;
use super::Flow;
use crate::domain::actions::EscapeMethod;
use crate::domain::card_effects::{default_card_choice, ChoiceKind};
use crate::domain::economy::free_upgrade_candidates;
use crate::domain::events::GameEvent;
use crate::domain::phase::Phase;
use crate::domain::rules::{CellIndex, Slot, AFK_STRIKE_LIMIT, BOARD_SIZE};
use crate::domain::state::{Room, RoomStatus};
use crate::errors::domain::{ConflictKind, DomainError};

/// Timer lengths that do not come from the room's own settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerDurations {
    /// Added to a phase entered through a card.
    pub card_extension: Duration,
    pub card_display: Duration,
    pub negotiation: Duration,
    pub disconnect_grace: Duration,
    /// Turn length for players marked AFK.
    pub afk_turn: Duration,
    /// How long past a deadline the watchdog waits.
    pub watchdog_grace: Duration,
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self {
            card_extension: Duration::from_millis(4_000),
            card_display: Duration::from_millis(3_000),
            negotiation: Duration::from_secs(60),
            disconnect_grace: Duration::from_secs(60),
            afk_turn: Duration::from_secs(5),
            watchdog_grace: Duration::from_secs(10),
        }
    }
}

/// How long the current phase may wait before its default is applied.
/// `None` when nothing is waiting on a player.
pub fn phase_deadline(room: &Room, durations: &TimerDurations) -> Option<Duration> {
    if room.status != RoomStatus::Playing {
        return None;
    }
    match room.phase {
        Phase::Lobby | Phase::GameOver | Phase::EndTurn => None,
        Phase::AwaitingCardDisplay { .. } => Some(durations.card_display),
        _ => {
            let afk = room.current_player().is_some_and(|p| p.afk);
            let base = if afk {
                durations.afk_turn
            } else {
                Duration::from_secs(u64::from(room.settings.turn_seconds))
            };
            if room.phase_via_card {
                Some(base + durations.card_extension)
            } else {
                Some(base)
            }
        }
    }
}

impl Flow<'_, '_> {
    /// Apply the default for the phase armed at `generation`. Fails with a
    /// stale-timer conflict when the room has moved on since.
    pub fn apply_timeout(&mut self, generation: u64) -> Result<(), DomainError> {
        if self.room.status != RoomStatus::Playing || self.room.phase_seq != generation {
            return Err(DomainError::conflict(
                ConflictKind::StaleTimer,
                format!("timer for generation {generation} no longer applies"),
            ));
        }
        let slot = self.room.current_slot;
        let phase = self.room.phase.clone();
        debug!(room_id = %self.room.id, slot, phase = phase.name(), "Phase timed out");
        self.emit(GameEvent::TimeoutApplied {
            slot,
            phase: phase.name().to_string(),
        });
        if phase.is_awaiting_player() {
            self.add_afk_strike(slot)?;
        }

        match phase {
            Phase::Lobby | Phase::GameOver => Ok(()),
            Phase::RollDice => self.roll_dice(),
            Phase::AwaitingAction { .. } | Phase::AwaitingBuild { .. } => self.finish_step(),
            Phase::AwaitingCardDisplay { .. } => self.end_turn(),
            Phase::IslandTurn => self.escape_island(EscapeMethod::Roll),
            Phase::AwaitingTravel => {
                let cells: Vec<CellIndex> = (0..BOARD_SIZE).filter(|&c| travel_target_ok(c)).collect();
                match self.pick(&cells) {
                    Some(cell) => self.travel_to(cell),
                    None => self.finish_step(),
                }
            }
            Phase::AwaitingFestival => {
                let lowest = self.player(slot)?.holdings.keys().next().copied();
                match lowest {
                    Some(cell) => self.choose_festival(cell),
                    None => self.finish_step(),
                }
            }
            Phase::AwaitingSell => self.auto_liquidate(),
            Phase::AwaitingBuyback { .. } => self.respond_to_buyback(false),
            Phase::AwaitingFreeBuilding => {
                match free_upgrade_candidates(self.room, slot).first().copied() {
                    Some(cell) => self.choose_free_building(cell),
                    None => self.finish_step(),
                }
            }
            Phase::AwaitingDestinationChoice
            | Phase::AwaitingTradeChoice
            | Phase::AwaitingFreezeChoice
            | Phase::AwaitingEminentDomainChoice => {
                let target = ChoiceKind::from_phase(&phase).and_then(|kind| {
                    default_card_choice(self.room, slot, kind, &mut *self.ctx.rng)
                });
                match target {
                    Some(target) => self.choose_card_target(target),
                    None => self.finish_step(),
                }
            }
            Phase::EndTurn => self.advance_turn(),
        }
    }

    fn add_afk_strike(&mut self, slot: Slot) -> Result<(), DomainError> {
        let player = self.player_mut(slot)?;
        player.afk_strikes = player.afk_strikes.saturating_add(1);
        if player.afk_strikes >= AFK_STRIKE_LIMIT && !player.afk {
            player.afk = true;
            info!(room_id = %self.room.id, slot, "Player marked AFK");
            self.emit(GameEvent::AfkChanged { slot, afk: true });
        }
        Ok(())
    }
}
