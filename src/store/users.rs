use chrono::Utc;

use super::{conflict_on_unique, Store};
use crate::error::AppError;
use crate::models::{User, UserCredentials};

const USER_COLUMNS: &str = "id, username, email, created_at, updated_at";
const DUPLICATE_IDENTITY: &str = "Email or username already in use";

impl Store {
    /// Inserts a new account. A live account with the same username or email
    /// yields `AppError::Conflict` and nothing is written.
    pub async fn insert_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users (username, email, password_hash, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_IDENTITY))
    }

    pub async fn find_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = ? AND deleted_at IS NULL",
            USER_COLUMNS
        );

        let user = sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, password_hash FROM users WHERE email = ? AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credentials)
    }

    /// Changes the provided fields of a live account.
    pub async fn update_user(
        &self,
        user_id: i64,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users SET username = COALESCE(?, username), email = COALESCE(?, email), \
             updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL \
             RETURNING {}",
            USER_COLUMNS
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .bind(email)
            .bind(Utc::now())
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_IDENTITY))
    }

    /// Marks the account and all of its todos as deleted in one transaction.
    /// Returns `false` if there was no live account to delete.
    pub async fn soft_delete_user(&self, user_id: i64) -> Result<bool, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE users SET deleted_at = ?, updated_at = ? \
             WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE todos SET deleted_at = ? WHERE user_id = ? AND deleted_at IS NULL")
            .bind(now)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
