#[cfg(test)]
use sea_orm::DatabaseConnection;

#[cfg(test)]
pub async fn setup_test_db() -> DatabaseConnection {
    // In-memory SQLite database for testing
    let config = crate::config::EngineConfig::in_memory();
    let db = crate::database::establish_connection(&config)
        .await
        .expect("Failed to connect to test database");

    crate::database::setup_database(&db)
        .await
        .expect("Failed to run migrations");

    db
}
