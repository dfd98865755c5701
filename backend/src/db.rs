use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{error, info};
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn establish_pool(config: &AppConfig) -> AppResult<DbPool> {
    info!("Creating database pool (max {} connections)", config.pool_max_size);
    let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
    Pool::builder()
        .max_size(config.pool_max_size)
        .connection_timeout(Duration::from_secs(10))
        .build(manager)
        .map_err(|e| {
            error!("Failed to establish database pool: {}", e);
            AppError::Pool(e)
        })
}

/// Pool that connects on first use; lets the router run without a live database.
pub fn lazy_pool(database_url: &str) -> DbPool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(1)
        .min_idle(Some(0))
        .connection_timeout(Duration::from_millis(500))
        .build_unchecked(manager)
}

pub fn run_migrations(conn: &mut PgConnection) -> AppResult<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| AppError::Migration(e.to_string()))?;
    for version in &applied {
        info!("Applied migration {}", version);
    }
    if applied.is_empty() {
        info!("Database schema is up to date");
    }
    Ok(())
}

pub fn ping(conn: &mut PgConnection) -> AppResult<i32> {
    let result = diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>("1"))
        .get_result(conn)?;
    Ok(result)
}
