//! SQLite connection pool management and schema migrations

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::error::{DatabaseError, DatabaseErrorKind, DatabaseOperation, Error, Result};

/// Create the connection pool and bring the schema up to date
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    let pool = create_pool(config).await?;
    migrate(&pool).await?;
    Ok(pool)
}

/// Create a SQLite connection pool with retry logic
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    create_pool_with_retries(config, config.max_retries).await
}

/// Apply embedded migrations
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Create a SQLite connection pool with configurable retries
///
/// Uses exponential backoff strategy for retries
async fn create_pool_with_retries(config: &DatabaseConfig, max_retries: u32) -> Result<SqlitePool> {
    let mut attempt = 0;
    let base_delay = Duration::from_secs(config.retry_delay_secs);

    loop {
        match try_create_pool(config).await {
            Ok(pool) => {
                if attempt > 0 {
                    tracing::info!(
                        "Database connection established after {} attempt(s)",
                        attempt + 1
                    );
                } else {
                    tracing::info!(
                        "Database connection pool created: max={}, min={}",
                        config.max_connections,
                        config.min_connections
                    );
                }
                return Ok(pool);
            }
            Err(e) => {
                attempt += 1;

                if attempt > max_retries {
                    tracing::error!(
                        "Failed to connect to database after {} attempts: {}",
                        max_retries + 1,
                        e
                    );
                    return Err(e);
                }

                let delay_multiplier = 2_u32.pow(attempt.saturating_sub(1));
                let delay = base_delay * delay_multiplier;

                tracing::warn!(
                    "Database connection attempt {} failed: {}. Retrying in {:?}...",
                    attempt,
                    e,
                    delay
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Attempt to create a database pool (single try)
async fn try_create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let options = connect_options(&config.url)?;

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.connection_timeout())
        .connect_with(options)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::connection_failed(format!(
                "Failed to open database at '{}': {}\n\n\
                Troubleshooting:\n\
                1. Check the URL format: sqlite://path/to/file.db or sqlite::memory:\n\
                2. Verify the parent directory exists and is writable\n\
                3. Make sure no other process holds an exclusive lock on the file\n\n\
                Original error: {}",
                config.url,
                categorize_db_error(&e),
                e
            )))
        })
}

/// Connection options shared by every pool: create the file, enforce foreign keys
fn connect_options(url: &str) -> Result<SqliteConnectOptions> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(|e| {
            Error::Database(DatabaseError::new(
                DatabaseOperation::Connect,
                DatabaseErrorKind::Configuration,
                format!("Invalid database URL '{}': {}", url, e),
            ))
        })?
        .create_if_missing(true)
        .foreign_keys(true);
    Ok(options)
}

/// Categorize database error for better user guidance
fn categorize_db_error(err: &sqlx::Error) -> &'static str {
    use sqlx::Error;
    match err {
        Error::Configuration(_) => "Configuration error",
        Error::Database(_) => "Database error",
        Error::Io(_) => "File I/O error - check path and permissions",
        Error::PoolTimedOut => "Connection pool timeout - database may be locked",
        Error::PoolClosed => "Connection pool closed",
        Error::WorkerCrashed => "Database worker crashed",
        _ => "Connection error",
    }
}

/// Migrated in-memory database on a single connection
///
/// Every pooled connection to `sqlite::memory:` opens its own database, so
/// the pool is pinned to one connection that never expires.
#[cfg(test)]
pub(crate) async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(connect_options("sqlite::memory:")?)
        .await?;
    migrate(&pool).await?;
    Ok(pool)
}
