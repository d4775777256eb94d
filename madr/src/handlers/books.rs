//! Book endpoints

use axum::extract::State;
use serde::Serialize;

use super::extract::{Json, Path, Query};
use super::query::BookListQuery;
use crate::auth::CurrentAccount;
use crate::error::{Error, Result};
use crate::messages;
use crate::models::{Book, BookPatch, BookSchema};
use crate::repository::Repository;
use crate::responses::{Created, Message};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BookList {
    pub livros: Vec<Book>,
}

/// `POST /livro`
pub async fn create_book(
    State(state): State<AppState>,
    _current: CurrentAccount,
    Json(payload): Json<BookSchema>,
) -> Result<Created<Book>> {
    let book = state.books().create(payload.validate()?).await?;
    let location = format!("/livro/{}", book.id);
    Ok(Created::new(book).with_location(location))
}

/// `GET /livro/{id}`
pub async fn get_book(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Book>> {
    state
        .books()
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| Error::NotFound(messages::BOOK_NOT_FOUND.to_string()))
}

/// `GET /livro?titulo=&ano=&romancista_id=&pagina=`
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookListQuery>,
) -> Result<Json<BookList>> {
    let filters = query.filters()?;
    let pagination = query.pagination()?;
    let livros = state.books().find_all(&filters, &pagination).await?;
    Ok(Json(BookList { livros }))
}

/// `PATCH /livro/{id}`
pub async fn update_book(
    State(state): State<AppState>,
    _current: CurrentAccount,
    Path(id): Path<i64>,
    Json(patch): Json<BookPatch>,
) -> Result<Json<Book>> {
    let book = state.books().update(id, patch.validate()?).await?;
    tracing::debug!(book_id = book.id, "Book updated");
    Ok(Json(book))
}

/// `DELETE /livro/{id}`
pub async fn delete_book(
    State(state): State<AppState>,
    _current: CurrentAccount,
    Path(id): Path<i64>,
) -> Result<Message> {
    state.books().delete(id).await?;
    Ok(Message::new(messages::BOOK_DELETED))
}

#[cfg(test)]
mod tests {
    use axum::{
        http::{Method, StatusCode},
        Router,
    };
    use serde_json::{json, Value};

    use crate::handlers::test_support::{app, authenticated, send};
    use crate::messages;

    async fn novelist(app: &Router, token: &str, nome: &str) -> i64 {
        let (status, body) = send(
            app,
            Method::POST,
            "/romancista",
            Some(token),
            Some(json!({"nome": nome})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    async fn book(app: &Router, token: &str, titulo: &str, ano: i32, romancista_id: i64) -> Value {
        let (status, body) = send(
            app,
            Method::POST,
            "/livro",
            Some(token),
            Some(json!({"titulo": titulo, "ano": ano, "romancista_id": romancista_id})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }

    async fn list(app: &Router, query: &str) -> Vec<Value> {
        let (status, body) = send(app, Method::GET, &format!("/livro{query}"), None, None).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["livros"].as_array().unwrap().clone()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let app = app().await;
        let token = authenticated(&app).await;
        let author = novelist(&app, &token, "machado de assis").await;

        let created = book(&app, &token, "Dom   Casmurro", 1899, author).await;
        assert_eq!(created["titulo"], "dom casmurro");
        assert_eq!(created["ano"], 1899);
        assert_eq!(created["romancista_id"], author);

        let (status, fetched) =
            send(&app, Method::GET, &format!("/livro/{}", created["id"]), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);

        let (status, body) = send(&app, Method::GET, "/livro/999", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], messages::BOOK_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_novelist_is_not_found_and_nothing_is_stored() {
        let app = app().await;
        let token = authenticated(&app).await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/livro",
            Some(&token),
            Some(json!({"titulo": "iracema", "ano": 1865, "romancista_id": 42})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], messages::NOVELIST_NOT_FOUND);
        assert!(list(&app, "").await.is_empty());
    }

    #[tokio::test]
    async fn test_deleting_a_novelist_cascades_to_its_books() {
        let app = app().await;
        let token = authenticated(&app).await;
        let a = novelist(&app, &token, "a").await;
        let b = novelist(&app, &token, "b").await;
        for i in 0..3 {
            book(&app, &token, &format!("livro a{i}"), 1900, a).await;
        }
        for i in 0..2 {
            book(&app, &token, &format!("livro b{i}"), 1900, b).await;
        }

        let (status, _) =
            send(&app, Method::DELETE, &format!("/romancista/{a}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let remaining = list(&app, "").await;
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|bk| bk["romancista_id"] == b));
    }

    #[tokio::test]
    async fn test_patch_changes_only_given_field() {
        let app = app().await;
        let token = authenticated(&app).await;
        let author = novelist(&app, &token, "aluísio azevedo").await;
        let created = book(&app, &token, "o cortiço", 1890, author).await;
        let uri = format!("/livro/{}", created["id"]);

        let (status, body) =
            send(&app, Method::PATCH, &uri, Some(&token), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], messages::DATA_MISSING_FIELDS);

        let (status, body) =
            send(&app, Method::PATCH, &uri, Some(&token), Some(json!({"ano": 1891}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ano"], 1891);
        assert_eq!(body["titulo"], "o cortiço");
        assert_eq!(body["romancista_id"], author);

        let (status, body) = send(
            &app,
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"romancista_id": 999})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], messages::NOVELIST_NOT_FOUND);

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/livro/999",
            Some(&token),
            Some(json!({"ano": 2000})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], messages::BOOK_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_pagination_keeps_insertion_order() {
        let app = app().await;
        let token = authenticated(&app).await;
        let author = novelist(&app, &token, "autor").await;
        for i in 0..30 {
            book(&app, &token, &format!("livro {i}"), 2000, author).await;
        }

        let first = list(&app, "").await;
        let second = list(&app, "?pagina=2").await;
        assert_eq!(first.len(), 20);
        assert_eq!(second.len(), 10);
        assert_eq!(first[0]["titulo"], "livro 0");
        assert_eq!(second[0]["titulo"], "livro 20");
        assert!(list(&app, "?pagina=3").await.is_empty());
    }

    #[tokio::test]
    async fn test_far_page_is_empty() {
        let app = app().await;
        let token = authenticated(&app).await;
        let author = novelist(&app, &token, "autor").await;
        book(&app, &token, "t", 2000, author).await;

        assert!(list(&app, "?pagina=9223372036854775807").await.is_empty());
        assert!(list(&app, "?pagina=4611686018427387905").await.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters() {
        let app = app().await;
        let token = authenticated(&app).await;
        let a = novelist(&app, &token, "a").await;
        let b = novelist(&app, &token, "b").await;
        book(&app, &token, "o cortiço", 1890, a).await;
        book(&app, &token, "o mulato", 1881, a).await;
        book(&app, &token, "casa de pensão", 1884, b).await;

        assert_eq!(list(&app, "?titulo=%20MUL").await.len(), 1);
        assert_eq!(list(&app, "?titulo=O").await.len(), 3);
        assert_eq!(list(&app, "?ano=1881").await.len(), 1);
        assert_eq!(list(&app, &format!("?romancista_id={b}")).await.len(), 1);
        assert_eq!(list(&app, &format!("?titulo=o&romancista_id={a}&ano=1890")).await.len(), 1);
        assert_eq!(list(&app, "?titulo=%25").await.len(), 0);

        let (status, _) = send(&app, Method::GET, "/livro?ano=9999", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, Method::GET, "/livro?ano=abc", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete() {
        let app = app().await;
        let token = authenticated(&app).await;
        let author = novelist(&app, &token, "autor").await;
        let created = book(&app, &token, "t", 2000, author).await;
        let uri = format!("/livro/{}", created["id"]);

        let (status, _) = send(&app, Method::DELETE, &uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], messages::BOOK_DELETED);

        let (status, body) = send(&app, Method::DELETE, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], messages::BOOK_NOT_FOUND);
    }
}
