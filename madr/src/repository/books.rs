//! Book persistence
//!
//! A book must reference a live novelist. Creation and re-assignment check
//! the novelist inside the same transaction as the write; the foreign key
//! catches anything that slips past the check and resolves to the same
//! not-found outcome.

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use super::pagination::{push_filters, push_window, FilterCondition, Pagination};
use super::traits::Repository;
use crate::conflict::settle;
use crate::error::{Error, Result};
use crate::messages;
use crate::models::{Book, BookChanges, NewBook};

const COLUMNS: &str = "id, title, year, novelist_id";

#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn novelist_exists(conn: &mut SqliteConnection, id: i64) -> Result<bool> {
    let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM novelists WHERE id = ?)")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(exists != 0)
}

fn novelist_not_found() -> Error {
    Error::NotFound(messages::NOVELIST_NOT_FOUND.to_string())
}

fn book_not_found() -> Error {
    Error::NotFound(messages::BOOK_NOT_FOUND.to_string())
}

impl Repository<Book, NewBook, BookChanges> for BookRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(&format!("SELECT {COLUMNS} FROM books WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    async fn find_all(&self, filters: &[FilterCondition], pagination: &Pagination) -> Result<Vec<Book>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM books"));
        push_filters(&mut query, filters);
        push_window(&mut query, pagination);

        let books = query.build_query_as::<Book>().fetch_all(&self.pool).await?;
        Ok(books)
    }

    async fn create(&self, data: NewBook) -> Result<Book> {
        let mut tx = self.pool.begin().await?;

        if !novelist_exists(&mut tx, data.novelist_id).await? {
            tracing::debug!(novelist_id = data.novelist_id, "Book references unknown novelist");
            return Err(novelist_not_found());
        }

        let result = sqlx::query_as::<_, Book>(&format!(
            "INSERT INTO books (title, year, novelist_id) VALUES (?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(&data.title)
        .bind(data.year)
        .bind(data.novelist_id)
        .fetch_one(&mut *tx)
        .await;

        let book = settle(tx, result).await?;
        tracing::info!(book_id = book.id, novelist_id = book.novelist_id, "Book created");
        Ok(book)
    }

    async fn update(&self, id: i64, data: BookChanges) -> Result<Book> {
        let mut tx = self.pool.begin().await?;

        let Some(mut book) =
            sqlx::query_as::<_, Book>(&format!("SELECT {COLUMNS} FROM books WHERE id = ?"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Err(book_not_found());
        };

        if let Some(novelist_id) = data.novelist_id {
            if novelist_id != book.novelist_id && !novelist_exists(&mut tx, novelist_id).await? {
                return Err(novelist_not_found());
            }
        }

        data.apply(&mut book);

        let result = sqlx::query_as::<_, Book>(&format!(
            "UPDATE books SET title = ?, year = ?, novelist_id = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(&book.title)
        .bind(book.year)
        .bind(book.novelist_id)
        .bind(id)
        .fetch_one(&mut *tx)
        .await;

        settle(tx, result).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await;

        if settle(tx, result).await?.rows_affected() == 0 {
            return Err(book_not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use crate::models::NewNovelist;
    use crate::repository::{NovelistRepository, PAGE_SIZE};

    async fn setup() -> (NovelistRepository, BookRepository, SqlitePool) {
        let pool = database::connect_in_memory().await.unwrap();
        (
            NovelistRepository::new(pool.clone()),
            BookRepository::new(pool.clone()),
            pool,
        )
    }

    async fn novelist(repo: &NovelistRepository, name: &str) -> i64 {
        repo.create(NewNovelist {
            name: name.to_string(),
        })
        .await
        .unwrap()
        .id
    }

    fn book(title: &str, year: i32, novelist_id: i64) -> NewBook {
        NewBook {
            title: title.to_string(),
            year,
            novelist_id,
        }
    }

    async fn count_books(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_with_unknown_novelist_persists_nothing() {
        let (_, books, pool) = setup().await;

        match books.create(book("dom casmurro", 1899, 99)).await {
            Err(Error::NotFound(msg)) => assert_eq!(msg, messages::NOVELIST_NOT_FOUND),
            other => panic!("expected not found, got {other:?}"),
        }
        assert_eq!(count_books(&pool).await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_titles_are_allowed() {
        let (novelists, books, _) = setup().await;
        let a = novelist(&novelists, "a").await;
        let b = novelist(&novelists, "b").await;

        books.create(book("iracema", 1865, a)).await.unwrap();
        books.create(book("iracema", 1865, a)).await.unwrap();
        books.create(book("iracema", 1900, b)).await.unwrap();
    }

    #[tokio::test]
    async fn test_cascade_delete_removes_only_that_novelists_books() {
        let (novelists, books, pool) = setup().await;
        let a = novelist(&novelists, "a").await;
        let b = novelist(&novelists, "b").await;
        for i in 0..3 {
            books.create(book(&format!("a{i}"), 1900, a)).await.unwrap();
        }
        for i in 0..2 {
            books.create(book(&format!("b{i}"), 1900, b)).await.unwrap();
        }

        novelists.delete(a).await.unwrap();

        let remaining = books.find_all(&[], &Pagination::default()).await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|bk| bk.novelist_id == b));
        assert_eq!(count_books(&pool).await, 2);
    }

    #[tokio::test]
    async fn test_update_checks_book_then_novelist() {
        let (novelists, books, _) = setup().await;
        let a = novelist(&novelists, "a").await;
        let created = books.create(book("t", 2000, a)).await.unwrap();

        let missing_book = books
            .update(
                created.id + 100,
                BookChanges {
                    novelist_id: Some(999),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(missing_book, Err(Error::NotFound(m)) if m == messages::BOOK_NOT_FOUND));

        let missing_novelist = books
            .update(
                created.id,
                BookChanges {
                    novelist_id: Some(999),
                    ..Default::default()
                },
            )
            .await;
        assert!(
            matches!(missing_novelist, Err(Error::NotFound(m)) if m == messages::NOVELIST_NOT_FOUND)
        );
        assert_eq!(books.find_by_id(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_update_changes_only_given_fields() {
        let (novelists, books, _) = setup().await;
        let a = novelist(&novelists, "a").await;
        let b = novelist(&novelists, "b").await;
        let created = books.create(book("t", 2000, a)).await.unwrap();

        let updated = books
            .update(
                created.id,
                BookChanges {
                    year: Some(2001),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "t");
        assert_eq!(updated.year, 2001);
        assert_eq!(updated.novelist_id, a);

        let moved = books
            .update(
                created.id,
                BookChanges {
                    novelist_id: Some(b),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(moved.novelist_id, b);
        assert_eq!(moved.year, 2001);
    }

    #[tokio::test]
    async fn test_pages_of_twenty_in_insertion_order() {
        let (novelists, books, _) = setup().await;
        let a = novelist(&novelists, "a").await;
        for i in 0..30 {
            books.create(book(&format!("livro {i}"), 2000, a)).await.unwrap();
        }

        let first = books
            .find_all(&[], &Pagination::page(1, PAGE_SIZE))
            .await
            .unwrap();
        let second = books
            .find_all(&[], &Pagination::page(2, PAGE_SIZE))
            .await
            .unwrap();
        let third = books
            .find_all(&[], &Pagination::page(3, PAGE_SIZE))
            .await
            .unwrap();

        assert_eq!(first.len(), 20);
        assert_eq!(second.len(), 10);
        assert!(third.is_empty());
        assert_eq!(first[0].title, "livro 0");
        assert_eq!(second[0].title, "livro 20");
        assert!(first.last().unwrap().id < second[0].id);
    }

    #[tokio::test]
    async fn test_filters_combine() {
        let (novelists, books, _) = setup().await;
        let a = novelist(&novelists, "a").await;
        let b = novelist(&novelists, "b").await;
        books.create(book("o cortiço", 1890, a)).await.unwrap();
        books.create(book("o mulato", 1881, a)).await.unwrap();
        books.create(book("o cortiço", 1890, b)).await.unwrap();

        let found = books
            .find_all(
                &[
                    FilterCondition::contains("title", "CORTI"),
                    FilterCondition::eq("year", 1890),
                    FilterCondition::eq("novelist_id", b),
                ],
                &Pagination::default(),
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].novelist_id, b);
    }

    #[tokio::test]
    async fn test_delete_missing_book() {
        let (_, books, _) = setup().await;
        assert!(matches!(
            books.delete(5).await,
            Err(Error::NotFound(m)) if m == messages::BOOK_NOT_FOUND
        ));
    }
}
