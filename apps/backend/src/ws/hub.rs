//! Room-scoped fan-out to connected WebSocket sessions.

use std::sync::Arc;

use actix::prelude::*;
use dashmap::DashMap;
use tracing::trace;
use uuid::Uuid;

use crate::domain::state::RoomId;
use crate::rooms::broadcast::{Broadcaster, EventBatch};

#[derive(Message, Clone)]
#[rtype(result = "()")]
pub struct RoomBroadcast(pub Arc<EventBatch>);

#[derive(Default)]
pub struct WsHub {
    rooms: DashMap<String, DashMap<Uuid, Recipient<RoomBroadcast>>>,
}

impl WsHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, room_id: &RoomId, recipient: Recipient<RoomBroadcast>) -> Uuid {
        let token = Uuid::new_v4();
        self.rooms
            .entry(room_id.to_string())
            .or_default()
            .insert(token, recipient);
        token
    }

    pub fn unregister(&self, room_id: &RoomId, token: Uuid) {
        let key = room_id.as_str();
        if let Some(entry) = self.rooms.get(key) {
            entry.remove(&token);
        }
        self.rooms.remove_if(key, |_, sessions| sessions.is_empty());
    }

    /// Sessions currently attached to `room_id`.
    pub fn session_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id.as_str()).map_or(0, |s| s.len())
    }
}

impl Broadcaster for WsHub {
    fn publish(&self, batch: Arc<EventBatch>) {
        let Some(sessions) = self.rooms.get(&batch.room_id) else {
            return;
        };
        trace!(
            room_id = %batch.room_id,
            version = batch.version,
            sessions = sessions.len(),
            "Broadcasting event batch"
        );
        for recipient in sessions.iter() {
            recipient.value().do_send(RoomBroadcast(batch.clone()));
        }
    }
}
