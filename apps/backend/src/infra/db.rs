use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

use crate::error::AppError;

/// Connect to the room database. Does not touch the schema.
pub async fn connect_db(database_url: &str) -> Result<DatabaseConnection, AppError> {
    let mut options = ConnectOptions::new(database_url.to_string());
    options.sqlx_logging(false);

    let conn = Database::connect(options).await?;
    info!(backend = ?conn.get_database_backend(), "Database connected");
    Ok(conn)
}
