use rental_listings::{app, config::AppConfig, db, services::maintenance, shutdown_signal, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    log::info!(
        "Loaded config: bind {} pool {} featured class '{}'",
        config.bind_address(),
        config.pool_max_size,
        config.featured_class
    );

    let pool = db::establish_pool(&config)?;
    {
        let mut conn = pool.get()?;
        let test_query = db::ping(&mut conn)?;
        log::info!("Database test query result: {}", test_query);

        if config.run_migrations {
            db::run_migrations(&mut conn)?;
        }
        if config.seed_lookups {
            maintenance::seed_lookups(&mut conn)?;
        }
    }

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Starting server on {}", addr);

    let state = AppState::new(config, pool);
    axum::serve(listener, app(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}
