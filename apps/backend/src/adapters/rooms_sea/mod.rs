//! SeaORM adapter for the room store - generic over ConnectionTrait.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::domain::state::{Room, RoomId};
use crate::entities::rooms;
use crate::errors::domain::DomainError;
use crate::infra::db_errors::map_db_err;
use crate::repos::rooms::RoomRepo;

mod dto;

pub use dto::{room_from_row, row_from_room};

// Adapter functions return DbErr; `SeaRoomRepo` maps to DomainError.

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: &str,
) -> Result<Option<rooms::Model>, sea_orm::DbErr> {
    rooms::Entity::find_by_id(room_id.to_string()).one(conn).await
}

pub async fn find_by_join_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    join_code: &str,
) -> Result<Option<rooms::Model>, sea_orm::DbErr> {
    rooms::Entity::find()
        .filter(rooms::Column::JoinCode.eq(join_code))
        .one(conn)
        .await
}

/// Insert the row, or overwrite every mutable column if it exists.
pub async fn upsert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    row: rooms::ActiveModel,
) -> Result<(), sea_orm::DbErr> {
    rooms::Entity::insert(row)
        .on_conflict(
            OnConflict::column(rooms::Column::Id)
                .update_columns([
                    rooms::Column::Status,
                    rooms::Column::Version,
                    rooms::Column::Document,
                    rooms::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// `RoomRepo` over a pooled SeaORM connection.
#[derive(Debug, Clone)]
pub struct SeaRoomRepo {
    db: DatabaseConnection,
}

impl SeaRoomRepo {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl RoomRepo for SeaRoomRepo {
    async fn load(&self, id: &RoomId) -> Result<Option<Room>, DomainError> {
        let row = find_by_id(&self.db, id.as_str()).await.map_err(map_db_err)?;
        row.map(room_from_row).transpose()
    }

    async fn load_by_join_code(&self, code: &str) -> Result<Option<Room>, DomainError> {
        let row = find_by_join_code(&self.db, code)
            .await
            .map_err(map_db_err)?;
        row.map(room_from_row).transpose()
    }

    async fn save(&self, room: &Room) -> Result<(), DomainError> {
        let row = row_from_room(room)?;
        upsert(&self.db, row).await.map_err(map_db_err)
    }

    fn kind(&self) -> &'static str {
        "database"
    }
}
