//! Service entry point.
//!
//! # Startup Flow
//!
//! 1. Initialize tracing from `RUST_LOG` (defaults to "info")
//! 2. Load configuration from environment variables
//! 3. Create the PostgreSQL connection pool and run migrations
//! 4. Wire the store, validation engine, and router
//! 5. Serve HTTP with peer addresses attached for the audit trail

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use api_key_service::{AppState, config, create_router, db, store::postgres::PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = config::Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let state = AppState::new(Arc::new(PgStore::new(pool)));
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // ConnectInfo makes the peer socket address visible to the caller
    // extractor when no X-Forwarded-For header is present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
