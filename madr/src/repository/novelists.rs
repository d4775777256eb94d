//! Novelist persistence

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::pagination::{push_filters, push_window, FilterCondition, Pagination};
use super::traits::Repository;
use crate::conflict::settle;
use crate::error::{Error, Result};
use crate::messages;
use crate::models::{NewNovelist, Novelist, NovelistChanges};

const COLUMNS: &str = "id, name";

#[derive(Debug, Clone)]
pub struct NovelistRepository {
    pool: SqlitePool,
}

impl NovelistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn not_found() -> Error {
    Error::NotFound(messages::NOVELIST_NOT_FOUND.to_string())
}

impl Repository<Novelist, NewNovelist, NovelistChanges> for NovelistRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Novelist>> {
        let novelist = sqlx::query_as::<_, Novelist>(&format!(
            "SELECT {COLUMNS} FROM novelists WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(novelist)
    }

    async fn find_all(
        &self,
        filters: &[FilterCondition],
        pagination: &Pagination,
    ) -> Result<Vec<Novelist>> {
        let mut query = QueryBuilder::<Sqlite>::new(format!("SELECT {COLUMNS} FROM novelists"));
        push_filters(&mut query, filters);
        push_window(&mut query, pagination);

        let novelists = query
            .build_query_as::<Novelist>()
            .fetch_all(&self.pool)
            .await?;
        Ok(novelists)
    }

    async fn create(&self, data: NewNovelist) -> Result<Novelist> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query_as::<_, Novelist>(&format!(
            "INSERT INTO novelists (name) VALUES (?) RETURNING {COLUMNS}"
        ))
        .bind(&data.name)
        .fetch_one(&mut *tx)
        .await;

        let novelist = settle(tx, result).await?;
        tracing::info!(novelist_id = novelist.id, "Novelist created");
        Ok(novelist)
    }

    async fn update(&self, id: i64, data: NovelistChanges) -> Result<Novelist> {
        let mut tx = self.pool.begin().await?;

        let Some(mut novelist) = sqlx::query_as::<_, Novelist>(&format!(
            "SELECT {COLUMNS} FROM novelists WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Err(not_found());
        };

        data.apply(&mut novelist);

        let result = sqlx::query_as::<_, Novelist>(&format!(
            "UPDATE novelists SET name = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(&novelist.name)
        .bind(id)
        .fetch_one(&mut *tx)
        .await;

        settle(tx, result).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Books go with their novelist through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM novelists WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await;

        let deleted = settle(tx, result).await?;
        if deleted.rows_affected() == 0 {
            return Err(not_found());
        }

        tracing::info!(novelist_id = id, "Novelist deleted with its books");
        Ok(())
    }
}
