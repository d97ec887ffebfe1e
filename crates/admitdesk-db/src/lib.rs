//! # Admit Desk DB
//!
//! Database pool, embedded migrations and repositories for the Admit Desk API.
//!
//! Handlers never touch SQL directly. They go through the repository traits
//! in [`repos`], which have a PostgreSQL implementation for production and an
//! in-memory implementation for tests and local experiments.
//!
//! # Example
//!
//! ```ignore
//! use admitdesk_db::{Repositories, init_db_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = init_db_pool(&std::env::var("DATABASE_URL")?).await?;
//!     run_migrations(&pool).await?;
//!     let repos = Repositories::postgres(pool);
//!     let settings = repos.settings.get_or_create().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod repos;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub use error::{DbError, DbResult};
pub use repos::{
    AdminRepository, Repositories, RollPlanner, SettingsRepository, StudentRepository,
};
// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Connects a PostgreSQL pool.
///
/// The pool is cheaply cloneable and is shared through the application state.
pub async fn init_db_pool(database_url: &str) -> DbResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;

    tracing::info!("Connected to PostgreSQL");
    Ok(pool)
}

/// Applies the embedded migrations under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> DbResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
