//! # madr
//!
//! Bibliographic catalog service: accounts, novelists ("romancistas") and
//! their books ("livros"), served as a JSON API over axum and SQLite.
//!
//! ## Features
//!
//! - **Accounts**: registration, Argon2id password hashing, JWT login and refresh
//! - **Catalog**: novelists and books with normalized text, partial updates and cascade delete
//! - **Listing**: substring and exact filters with fixed-size pages
//! - **Integrity**: constraint violations resolved into typed 404/409 outcomes
//! - **Operations**: layered configuration, JSON logging, health and readiness probes
//!
//! ## Example
//!
//! ```rust,no_run
//! use madr::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let pool = madr::database::connect(&config.database).await?;
//!     let state = AppState::new(config.clone(), pool)?;
//!
//!     Server::new(config).serve(router(state)).await
//! }
//! ```

pub mod auth;
pub mod config;
pub mod conflict;
pub mod database;
pub mod error;
pub mod handlers;
pub mod health;
pub mod messages;
pub mod models;
pub mod normalize;
pub mod observability;
pub mod repository;
pub mod responses;
pub mod server;
pub mod state;
pub mod validation;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::auth::{AccessToken, Claims, CurrentAccount, PasswordHasher, TokenIssuer};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::handlers::router;
    pub use crate::models::{Account, AccountPublic, Book, Novelist};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        AccountRepository, BookRepository, NovelistRepository, Pagination, Repository,
    };
    pub use crate::responses::{Created, Message};
    pub use crate::server::Server;
    pub use crate::state::AppState;
}
