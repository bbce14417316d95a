//! Database Infrastructure Layer
//!
//! PostgreSQL adapters for every store port in the system, built on SQLx.
//! Queries use the runtime API with `FromRow` mappings so the crate builds
//! without a live database; schema lives in embedded migrations.

pub mod pool;
pub mod error;
pub mod repositories;

pub use pool::{DatabaseConfig, DatabasePool, PoolHealth, create_pool, create_pool_from_url};
pub use error::DatabaseError;
pub use repositories::{
    ClaimsRepository, CommunicationsRepository, CoverageRepository, DirectoryRepository,
};

/// Applies the embedded migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<(), DatabaseError> {
    tracing::info!("running database migrations");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
    tracing::info!("database ready");
    Ok(())
}
