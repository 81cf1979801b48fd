//! Data access layer
//!
//! `BusinessStore` is the seam between services and persistence. The
//! PostgreSQL store backs deployments; the in-memory store backs tests and
//! local development.

pub mod memory;
pub mod store;
pub mod traits;

pub use memory::InMemoryBusinessStore;
pub use store::PostgresBusinessStore;
pub use traits::BusinessStore;

use crate::{config::DatabaseConfig, Result};
use sqlx::PgPool;

/// Create a PostgreSQL connection pool with per-connection timeouts.
pub async fn connect(config: &DatabaseConfig, url: &str) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let statement_timeout = config.statement_timeout_seconds;
    let lock_timeout = config.lock_timeout_seconds;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(config.pool_min_size)
        .max_connections(config.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(config.pool_timeout_seconds))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                // Max query execution time
                sqlx::query(&format!("SET statement_timeout = '{}s'", statement_timeout))
                    .execute(&mut *conn)
                    .await?;

                // Max lock wait time (fail fast on contended rows)
                sqlx::query(&format!("SET lock_timeout = '{}s'", lock_timeout))
                    .execute(&mut *conn)
                    .await?;

                Ok(())
            })
        })
        .connect(url)
        .await
        .map_err(crate::Error::Database)?;

    tracing::info!(
        "Database pool created (min: {}, max: {})",
        config.pool_min_size,
        config.pool_max_size
    );

    Ok(pool)
}

/// Apply the embedded schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
