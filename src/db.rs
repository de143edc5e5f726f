//! Database connection pool and migration management.
//!
//! This module provides utilities for:
//! - Creating and managing a PostgreSQL connection pool
//! - Running database migrations automatically at startup

use sqlx::{Pool, Postgres};

/// Type alias for PostgreSQL connection pool.
pub type DbPool = Pool<Postgres>;

/// Create a new PostgreSQL connection pool.
///
/// A connection pool maintains multiple database connections that are reused
/// across HTTP requests instead of opening a new connection per request.
///
/// # Errors
///
/// Returns an error if:
/// - The connection string is invalid
/// - The PostgreSQL server is unreachable
/// - Database authentication fails
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::postgres::PgPoolOptions::new()
        // Limit concurrent connections
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Run database migrations from the `migrations/` directory.
///
/// Migrations are tracked in the `_sqlx_migrations` table, so each migration
/// runs only once. The schema covers the `api_keys` table and the append-only
/// `usage_records` audit table.
///
/// # Errors
///
/// Returns an error if a migration file contains invalid SQL or the database
/// rejects a migration statement.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    // The macro embeds migrations at compile time from ./migrations
    sqlx::migrate!("./migrations").run(pool).await
}
