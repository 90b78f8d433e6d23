//! Conversions between the room document and its table row.

use sea_orm::Set;

use crate::domain::state::Room;
use crate::entities::rooms;
use crate::errors::domain::{DomainError, InfraErrorKind};

pub fn row_from_room(room: &Room) -> Result<rooms::ActiveModel, DomainError> {
    let document = serde_json::to_value(room)?;
    Ok(rooms::ActiveModel {
        id: Set(room.id.to_string()),
        join_code: Set(room.join_code.clone()),
        status: Set(room.status.as_str().to_string()),
        version: Set(room.version),
        document: Set(document),
        created_at: Set(room.created_at),
        updated_at: Set(room.updated_at),
    })
}

/// Rebuild the room from its stored document. The document must agree
/// with the row it came from.
pub fn room_from_row(row: rooms::Model) -> Result<Room, DomainError> {
    let room: Room = serde_json::from_value(row.document)?;
    if room.id.as_str() != row.id {
        return Err(DomainError::infra(
            InfraErrorKind::DataCorruption,
            format!("room row {} holds document for {}", row.id, room.id),
        ));
    }
    Ok(room)
}
