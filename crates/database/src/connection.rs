use crate::error::DbError;
use configuration::DatabaseConfig;
use dotenvy::dotenv;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;

/// Establishes a connection pool to the PostgreSQL database.
///
/// Reads `DATABASE_URL` (from the environment or a `.env` file) and sizes the
/// pool from `config`. The pool is shared across the entire application.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DbError> {
    let database_url = database_url()?;

    let pool = pool_options(config).connect(&database_url).await?;
    tracing::info!(max_connections = config.max_connections, "Connected to the database.");

    Ok(pool)
}

/// Builds a pool that only opens connections when a query first needs one.
pub fn connect_lazy(database_url: &str, config: &DatabaseConfig) -> Result<PgPool, DbError> {
    Ok(pool_options(config).connect_lazy(database_url)?)
}

/// Applies the embedded migrations so the schema is up to date at startup.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn database_url() -> Result<String, DbError> {
    // A missing .env file is fine as long as the variable is set some other way.
    dotenv().ok();
    env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
}
