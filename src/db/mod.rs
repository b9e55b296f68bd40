use crate::config::database::Database;
use crate::error::UsersMigrationResult;
use sea_orm::{ConnectOptions, DatabaseConnection};
use tracing::debug;

/// Connect to the database described by the config. Unless `connect-lazy` is set, this fails
/// right away if the database can't be reached.
pub async fn connect(database: &Database) -> UsersMigrationResult<DatabaseConnection> {
    debug!(
        host = database.uri.host_str(),
        port = database.uri.port(),
        db = database.uri.path().trim_start_matches('/'),
        "Connecting to the database"
    );
    let db = sea_orm::Database::connect(ConnectOptions::from(database)).await?;
    Ok(db)
}
