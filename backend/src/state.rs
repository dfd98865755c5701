use diesel::pg::PgConnection;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::error::AppResult;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pool: DbPool,
}

impl AppState {
    pub fn new(config: AppConfig, pool: DbPool) -> Self {
        Self {
            config: Arc::new(config),
            pool,
        }
    }

    /// Runs a blocking Diesel call on a pooled connection off the async runtime.
    pub async fn run<F, T>(&self, f: F) -> AppResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AppResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut *conn)
        })
        .await?
    }
}
