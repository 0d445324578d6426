//! # Levelboard API Server
//!
//! Serves the points, actions, stats and classification ranking endpoints
//! over PostgreSQL.
//!
//! ## Startup
//!
//! 1. Tracing (`RUST_LOG` filter, `LOG_FORMAT=json` for JSON lines)
//! 2. Configuration from the environment
//! 3. Database creation if missing, pool, migrations
//! 4. Router and HTTP listener with graceful shutdown on Ctrl+C
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/levelboard JWT_SECRET=... cargo run -p levelboard-api
//! ```

use levelboard_api::{
    app::{build_router, AppState},
    config::Config,
};
use levelboard_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig, PoolStats},
    },
    store::postgres::PgStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let json_logs = std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "levelboard_api=debug,levelboard_shared=info,tower_http=debug".into()
            }),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("Levelboard API Server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    ensure_database_exists(&config.database.url).await?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&pool).await?;

    let stats = PoolStats::from_pool(&pool);
    tracing::info!(
        total_connections = stats.total_connections,
        idle_connections = stats.idle_connections,
        "Database ready"
    );

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(PgStore::new(pool.clone())), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(&pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
