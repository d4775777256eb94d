//! Account persistence

use sqlx::SqlitePool;

use crate::conflict::settle;
use crate::error::{Error, Result};
use crate::messages;
use crate::models::{Account, AccountChanges, NewAccount};

const COLUMNS: &str = "id, username, email, password";

#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

impl AccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Account>> {
        let account =
            sqlx::query_as::<_, Account>(&format!("SELECT {COLUMNS} FROM accounts WHERE id = ?"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(account)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {COLUMNS} FROM accounts WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    /// Insert an account; username and email collisions become 409s
    pub async fn create(&self, data: NewAccount) -> Result<Account> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query_as::<_, Account>(&format!(
            "INSERT INTO accounts (username, email, password) VALUES (?, ?, ?) RETURNING {COLUMNS}"
        ))
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password_hash)
        .fetch_one(&mut *tx)
        .await;

        let account = settle(tx, result).await?;
        tracing::info!(account_id = account.id, "Account created");
        Ok(account)
    }

    /// Merge changes onto the stored account; `changes.password` must be a hash
    pub async fn update(&self, id: i64, changes: AccountChanges) -> Result<Account> {
        let mut tx = self.pool.begin().await?;

        let Some(mut account) =
            sqlx::query_as::<_, Account>(&format!("SELECT {COLUMNS} FROM accounts WHERE id = ?"))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        else {
            return Err(Error::NotFound(messages::ACCOUNT_NOT_FOUND.to_string()));
        };

        changes.apply(&mut account);

        let result = sqlx::query_as::<_, Account>(&format!(
            "UPDATE accounts SET username = ?, email = ?, password = ? WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password)
        .bind(id)
        .fetch_one(&mut *tx)
        .await;

        settle(tx, result).await
    }

    /// Replace the stored hash, used when upgrading hash parameters on login
    pub async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE accounts SET password = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await;

        if settle(tx, result).await?.rows_affected() == 0 {
            return Err(Error::NotFound(messages::ACCOUNT_NOT_FOUND.to_string()));
        }

        tracing::info!(account_id = id, "Account deleted");
        Ok(())
    }
}
