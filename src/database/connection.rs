use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DatabaseTransaction, DbBackend,
    DbErr, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::debug;

use crate::config::EngineConfig;
use crate::database::migrations::Migrator;

pub async fn establish_connection(config: &EngineConfig) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(config.database_url.clone());

    // Every connection to an in-memory SQLite url opens a fresh database
    if config.database_url.contains(":memory:") {
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(config.max_connections)
            .min_connections(1);
    }

    opt.connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(config.sqlx_logging)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    // Readers never block the single writer. The mode is stored in the file.
    if db.get_database_backend() == DbBackend::Sqlite && !config.database_url.contains(":memory:") {
        db.execute_unprepared("PRAGMA journal_mode = WAL").await?;
        debug!("SQLite journal mode set to WAL");
    }

    Ok(db)
}

/// Statement that makes SQLite take its write lock without touching a row
const SQLITE_WRITE_LOCK: &str = "UPDATE ea_models SET updated_at = updated_at WHERE 0";

/// Open a transaction that will write.
///
/// On SQLite a plain `BEGIN` takes the write lock lazily, and upgrading a read
/// lock fails with `SQLITE_BUSY` at once if another writer is active. Taking
/// the lock as the first statement lets concurrent writers queue on the
/// connection's busy timeout instead.
pub async fn begin_write<C>(db: &C) -> Result<DatabaseTransaction, DbErr>
where
    C: TransactionTrait + ConnectionTrait,
{
    let txn = db.begin().await?;
    if txn.get_database_backend() == DbBackend::Sqlite {
        txn.execute_unprepared(SQLITE_WRITE_LOCK).await?;
    }
    Ok(txn)
}

/// Bring the schema up to date
pub async fn setup_database(db: &DatabaseConnection) -> Result<(), DbErr> {
    Migrator::up(db, None).await
}

pub fn get_database_url(database_path: Option<&str>) -> String {
    match database_path {
        Some(":memory:") => "sqlite::memory:".to_string(),
        Some(path) => format!("sqlite://{}?mode=rwc", path),
        None => "sqlite://eagraph.db?mode=rwc".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_variants() {
        assert_eq!(get_database_url(Some(":memory:")), "sqlite::memory:");
        assert_eq!(
            get_database_url(Some("/tmp/ea.db")),
            "sqlite:///tmp/ea.db?mode=rwc"
        );
        assert_eq!(get_database_url(None), "sqlite://eagraph.db?mode=rwc");
    }
}
