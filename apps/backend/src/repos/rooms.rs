//! Room persistence port. The actor loads a room once and saves after every
//! committed mutation; the last write wins.

use async_trait::async_trait;

use crate::domain::state::{Room, RoomId};
use crate::errors::domain::DomainError;

#[async_trait]
pub trait RoomRepo: Send + Sync {
    async fn load(&self, id: &RoomId) -> Result<Option<Room>, DomainError>;

    /// `code` must already be normalized.
    async fn load_by_join_code(&self, code: &str) -> Result<Option<Room>, DomainError>;

    /// Insert or overwrite the stored document.
    async fn save(&self, room: &Room) -> Result<(), DomainError>;

    /// Short name for health output and logs.
    fn kind(&self) -> &'static str;
}
