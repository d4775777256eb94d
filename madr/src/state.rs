//! Application state shared by every handler

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{PasswordHasher, TokenIssuer};
use crate::config::Config;
use crate::error::Result;
use crate::repository::{AccountRepository, BookRepository, NovelistRepository};

/// Immutable configuration plus the handles built from it at startup
///
/// Cloning is cheap: the pool is reference counted and the signing keys sit
/// behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    pool: SqlitePool,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
}

impl AppState {
    /// Build state from loaded configuration and an open pool
    ///
    /// Fails when the signing algorithm or the hashing parameters are invalid.
    pub fn new(config: Config, pool: SqlitePool) -> Result<Self> {
        let hasher = PasswordHasher::new(&config.password)?;
        let tokens = TokenIssuer::new(&config.jwt)?;

        Ok(Self {
            config: Arc::new(config),
            pool,
            hasher,
            tokens,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new(self.pool.clone())
    }

    pub fn novelists(&self) -> NovelistRepository {
        NovelistRepository::new(self.pool.clone())
    }

    pub fn books(&self) -> BookRepository {
        BookRepository::new(self.pool.clone())
    }
}

/// State over a fresh in-memory database with cheap hashing
#[cfg(test)]
pub(crate) async fn test_state() -> AppState {
    let mut config = Config::default();
    config.password = crate::auth::password::test_config();
    config.jwt.secret_key = "test-secret".to_string();

    let pool = crate::database::connect_in_memory().await.unwrap();
    AppState::new(config, pool).unwrap()
}
