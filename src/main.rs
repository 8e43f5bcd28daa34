use std::sync::Arc;

use anyhow::Result;
use scorekeeper_backend::{
    config::Config,
    db::{self, GameStore, MemoryGameStore, PgGameStore},
    routes, AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scorekeeper_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting scorekeeper backend server...");

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let store: Arc<dyn GameStore> = match config.database_url() {
        Some(url) => {
            // Connect to database
            let pool = db::create_pool(url, config.database.max_connections).await?;
            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations completed");

            Arc::new(PgGameStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set. Using in-memory store, data will not persist.");
            Arc::new(MemoryGameStore::new())
        }
    };

    let state = Arc::new(AppState::new(config.clone(), store));
    let app = routes::create_app(state);

    // Start server
    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
