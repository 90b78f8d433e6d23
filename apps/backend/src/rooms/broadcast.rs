use std::sync::Arc;

use serde::Serialize;

use crate::domain::events::GameEvent;
use crate::domain::snapshot::RoomSnapshot;

/// Everything one committed mutation produced, in commit order.
#[derive(Debug, Clone, Serialize)]
pub struct EventBatch {
    pub room_id: String,
    pub version: i32,
    pub events: Vec<GameEvent>,
    pub snapshot: RoomSnapshot,
}

/// Fan-out for committed batches. Called from the room actor after the
/// save succeeded; implementations must not block.
pub trait Broadcaster: Send + Sync {
    fn publish(&self, batch: Arc<EventBatch>);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBroadcaster;

impl Broadcaster for NoopBroadcaster {
    fn publish(&self, _batch: Arc<EventBatch>) {}
}
