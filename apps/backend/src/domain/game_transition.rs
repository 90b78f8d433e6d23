use crate::domain::events::GameEvent;
use crate::domain::phase::Phase;
use crate::domain::rules::Slot;
use crate::domain::state::{Room, RoomStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomLifecycleView {
    pub status: RoomStatus,
    pub phase: Phase,
    pub phase_seq: u64,
    pub current_slot: Slot,
    pub round: u32,
}

impl RoomLifecycleView {
    pub fn of(room: &Room) -> Self {
        Self {
            status: room.status,
            phase: room.phase.clone(),
            phase_seq: room.phase_seq,
            current_slot: room.current_slot,
            round: room.round,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomTransition {
    /// Edge-triggered: the turn passed to a slot.
    TurnBecame { slot: Slot, round: u32 },

    /// Edge-triggered: waiting -> playing.
    GameStarted,

    /// Edge-triggered: any -> finished.
    GameEnded,

    /// Edge-triggered: any -> abandoned.
    GameAbandoned,

    /// A new phase was entered, including re-entry of the same phase.
    PhaseChanged { phase: Phase },
}

/// Derive lifecycle transitions from before/after views.
pub fn derive_room_transitions(
    before: &RoomLifecycleView,
    after: &RoomLifecycleView,
) -> Vec<RoomTransition> {
    let mut transitions = Vec::new();

    if before.status == RoomStatus::Waiting && after.status == RoomStatus::Playing {
        transitions.push(RoomTransition::GameStarted);
    }

    if after.status == RoomStatus::Playing
        && (before.current_slot != after.current_slot || before.status != RoomStatus::Playing)
    {
        transitions.push(RoomTransition::TurnBecame {
            slot: after.current_slot,
            round: after.round,
        });
    }

    if before.phase_seq != after.phase_seq {
        transitions.push(RoomTransition::PhaseChanged {
            phase: after.phase.clone(),
        });
    }

    if before.status != RoomStatus::Finished && after.status == RoomStatus::Finished {
        transitions.push(RoomTransition::GameEnded);
    }

    if before.status != RoomStatus::Abandoned && after.status == RoomStatus::Abandoned {
        transitions.push(RoomTransition::GameAbandoned);
    }

    transitions
}

impl RoomTransition {
    /// Event form; `GameEnded` carries the winner from the room.
    pub fn into_event(self, room: &Room) -> GameEvent {
        match self {
            RoomTransition::TurnBecame { slot, round } => GameEvent::TurnBecame { slot, round },
            RoomTransition::GameStarted => GameEvent::GameStarted,
            RoomTransition::GameEnded => GameEvent::GameEnded {
                winner: room.winner,
            },
            RoomTransition::GameAbandoned => GameEvent::GameAbandoned,
            RoomTransition::PhaseChanged { phase } => GameEvent::PhaseChanged { phase },
        }
    }
}
