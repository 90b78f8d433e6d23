//! In-process room store backed by `DashMap`. Used when no database URL is
//! configured and throughout the test suites.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::warn;

use crate::domain::state::{Room, RoomId};
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::repos::rooms::RoomRepo;

#[derive(Debug, Default)]
pub struct MemoryRoomRepo {
    rooms: DashMap<RoomId, Room>,
    codes: DashMap<String, RoomId>,
    failing_saves: AtomicU32,
    saves: AtomicU32,
}

impl MemoryRoomRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` saves fail with `DbUnavailable`.
    pub fn fail_next_saves(&self, n: u32) {
        self.failing_saves.store(n, Ordering::SeqCst);
    }

    /// Successful saves so far.
    pub fn save_count(&self) -> u32 {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    fn take_failure(&self) -> bool {
        self.failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl RoomRepo for MemoryRoomRepo {
    async fn load(&self, id: &RoomId) -> Result<Option<Room>, DomainError> {
        Ok(self.rooms.get(id).map(|r| r.value().clone()))
    }

    async fn load_by_join_code(&self, code: &str) -> Result<Option<Room>, DomainError> {
        let Some(id) = self.codes.get(code).map(|e| e.value().clone()) else {
            return Ok(None);
        };
        self.load(&id).await
    }

    async fn save(&self, room: &Room) -> Result<(), DomainError> {
        if self.take_failure() {
            warn!(room_id = %room.id, "Injected save failure");
            return Err(DomainError::infra(
                InfraErrorKind::DbUnavailable,
                "room store unavailable",
            ));
        }
        self.codes.insert(room.join_code.clone(), room.id.clone());
        self.rooms.insert(room.id.clone(), room.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
