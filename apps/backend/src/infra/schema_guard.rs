use sea_orm::{ConnectionTrait, DatabaseConnection, Schema};
use tracing::info;

use crate::entities::rooms;
use crate::error::AppError;

/// Create the `rooms` table when it is missing. The table is the only
/// schema this service owns, so it is derived from the entity directly.
pub async fn ensure_schema_ready(db: &DatabaseConnection) -> Result<(), AppError> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut create = schema.create_table_from_entity(rooms::Entity);
    create.if_not_exists();

    db.execute(backend.build(&create)).await?;
    info!("Room schema ready");
    Ok(())
}
