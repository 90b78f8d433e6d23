//! Turn orchestration: validates actions against the phase table and drives
//! the pure domain subsystems against a working copy of the room.
//!
//! Everything here is synchronous. The room actor owns persistence, timers,
//! and broadcasting; it hands the orchestrator a room and a `FlowCtx` and
//! gets back a new room plus the events to publish.

mod abilities;
mod cards;
mod deltas;
mod insolvency;
mod island;
mod landing;
mod lobby;
mod movement;
mod mutation;
mod negotiation;
mod player_actions;
mod property;
mod round_lifecycle;
mod timeouts;

#[cfg(test)]
mod tests_flow_lobby;
#[cfg(test)]
mod tests_flow_negotiation;
#[cfg(test)]
mod tests_flow_sell;

use rand::RngCore;
use time::OffsetDateTime;

use crate::domain::dice::{Dice, DiceOverrides};
use crate::domain::events::GameEvent;
use crate::domain::rules::Slot;
use crate::domain::state::{Player, Room};
use crate::errors::domain::{DomainError, NotFoundKind};

pub use lobby::NewRoom;
pub use mutation::MutationResult;
pub use timeouts::{phase_deadline, TimerDurations};

/// Stateless entry point; all state lives in the room and the `FlowCtx`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GameFlowService;

/// Randomness and clock for one mutation.
pub struct FlowCtx<'c> {
    pub dice: &'c mut dyn Dice,
    pub overrides: &'c mut DiceOverrides,
    pub rng: &'c mut dyn RngCore,
    pub now: OffsetDateTime,
}

/// One mutation in progress: the working copy plus the events it produced.
pub struct Flow<'a, 'c> {
    room: &'a mut Room,
    ctx: &'a mut FlowCtx<'c>,
    events: Vec<GameEvent>,
}

impl<'a, 'c> Flow<'a, 'c> {
    fn new(room: &'a mut Room, ctx: &'a mut FlowCtx<'c>) -> Self {
        Self {
            room,
            ctx,
            events: Vec::new(),
        }
    }

    pub fn room(&self) -> &Room {
        self.room
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn player(&self, slot: Slot) -> Result<&Player, DomainError> {
        self.room.player(slot).ok_or_else(|| missing_player(slot))
    }

    fn player_mut(&mut self, slot: Slot) -> Result<&mut Player, DomainError> {
        self.room.player_mut(slot).ok_or_else(|| missing_player(slot))
    }
}

fn missing_player(slot: Slot) -> DomainError {
    DomainError::not_found(NotFoundKind::Player, format!("no player in slot {slot}"))
}
