use tracing::debug;

use super::{Flow, FlowCtx, GameFlowService};
use crate::domain::events::GameEvent;
use crate::domain::game_transition::{derive_room_transitions, RoomLifecycleView};
use crate::domain::state::Room;
use crate::errors::domain::{ConflictKind, DomainError};

#[derive(Debug)]
pub struct MutationResult {
    pub room: Room,
    pub old_version: i32,
    pub events: Vec<GameEvent>,
}

impl MutationResult {
    pub fn final_version(&self) -> i32 {
        self.room.version
    }
}

impl GameFlowService {
    /// Run `mutation` against a copy of `room`. On error the copy is dropped,
    /// so failed actions never leave partial state behind. On success the
    /// version is bumped and lifecycle transitions are appended to the
    /// explicit events.
    pub fn run_mutation<F>(
        &self,
        room: &Room,
        expected_version: Option<i32>,
        ctx: &mut FlowCtx<'_>,
        mutation: F,
    ) -> Result<MutationResult, DomainError>
    where
        F: FnOnce(&mut Flow<'_, '_>) -> Result<(), DomainError>,
    {
        if let Some(expected) = expected_version {
            if expected != room.version {
                return Err(DomainError::conflict(
                    ConflictKind::OptimisticLock,
                    format!(
                        "Room was modified concurrently (expected version {}, actual version {}). Please refresh and retry.",
                        expected, room.version
                    ),
                ));
            }
        }

        let before = RoomLifecycleView::of(room);
        let mut working = room.clone();
        let now = ctx.now;

        let mut events = {
            let mut flow = Flow::new(&mut working, ctx);
            mutation(&mut flow)?;
            flow.events
        };

        let after = RoomLifecycleView::of(&working);
        events.extend(
            derive_room_transitions(&before, &after)
                .into_iter()
                .map(|t| t.into_event(&working)),
        );

        working.version += 1;
        working.updated_at = now;
        debug!(
            room_id = %working.id,
            version = working.version,
            phase = working.phase.name(),
            events = events.len(),
            "Room mutation applied"
        );

        Ok(MutationResult {
            room: working,
            old_version: room.version,
            events,
        })
    }
}
