//! HTTP handlers and routing
//!
//! Protected handlers take [`CurrentAccount`](crate::auth::CurrentAccount)
//! before any body extractor, so an unauthenticated request is rejected
//! before its payload is looked at.

mod accounts;
mod books;
pub mod extract;
mod novelists;
pub mod query;
mod token;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::health;
use crate::state::AppState;

/// Build the application router
///
/// Collection paths answer with and without a trailing slash.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/ready", get(health::readiness))
        .route("/conta", post(accounts::create_account))
        .route("/conta/", post(accounts::create_account))
        .route(
            "/conta/{id}",
            put(accounts::update_account).delete(accounts::delete_account),
        )
        .route("/token", post(token::login))
        .route("/refresh-token", post(token::refresh_token))
        .route(
            "/romancista",
            post(novelists::create_novelist).get(novelists::list_novelists),
        )
        .route(
            "/romancista/",
            post(novelists::create_novelist).get(novelists::list_novelists),
        )
        .route(
            "/romancista/{id}",
            get(novelists::get_novelist)
                .patch(novelists::update_novelist)
                .delete(novelists::delete_novelist),
        )
        .route("/livro", post(books::create_book).get(books::list_books))
        .route("/livro/", post(books::create_book).get(books::list_books))
        .route(
            "/livro/{id}",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        .with_state(state)
}
