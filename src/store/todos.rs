use chrono::Utc;

use super::Store;
use crate::error::AppError;
use crate::models::{CreateTodoRequest, Todo, UpdateTodoRequest};

const TODO_COLUMNS: &str = "id, item, completed, user_id, created_at, updated_at";

impl Store {
    /// Inserts a todo owned by `owner_id`.
    ///
    /// Returns `None` when the owner does not exist or is soft-deleted; the owner
    /// check and the insert are one statement.
    pub async fn insert_todo(
        &self,
        owner_id: i64,
        input: &CreateTodoRequest,
    ) -> Result<Option<Todo>, AppError> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO todos (item, completed, user_id, created_at, updated_at) \
             SELECT ?, ?, id, ?, ? FROM users WHERE id = ? AND deleted_at IS NULL \
             RETURNING {}",
            TODO_COLUMNS
        );

        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(&input.item)
            .bind(input.completed())
            .bind(now)
            .bind(now)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(todo)
    }

    /// All live todos of `owner_id`, newest first.
    pub async fn list_todos(&self, owner_id: i64) -> Result<Vec<Todo>, AppError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE user_id = ? AND deleted_at IS NULL \
             ORDER BY id DESC",
            TODO_COLUMNS
        );

        let todos = sqlx::query_as::<_, Todo>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(todos)
    }

    pub async fn find_todo(&self, todo_id: i64, owner_id: i64) -> Result<Option<Todo>, AppError> {
        let sql = format!(
            "SELECT {} FROM todos WHERE id = ? AND user_id = ? AND deleted_at IS NULL",
            TODO_COLUMNS
        );

        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(todo_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(todo)
    }

    /// Applies a partial update in a single filtered statement.
    ///
    /// A missing or empty item keeps the stored one; a present `completed`
    /// always overwrites.
    pub async fn update_todo(
        &self,
        todo_id: i64,
        owner_id: i64,
        patch: &UpdateTodoRequest,
    ) -> Result<Option<Todo>, AppError> {
        let sql = format!(
            "UPDATE todos SET item = COALESCE(?, item), completed = COALESCE(?, completed), \
             updated_at = ? \
             WHERE id = ? AND user_id = ? AND deleted_at IS NULL \
             RETURNING {}",
            TODO_COLUMNS
        );

        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(patch.item())
            .bind(patch.completed)
            .bind(Utc::now())
            .bind(todo_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(todo)
    }

    /// Marks a todo as deleted. Returns `false` if nothing matched.
    pub async fn soft_delete_todo(&self, todo_id: i64, owner_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE todos SET deleted_at = ? \
             WHERE id = ? AND user_id = ? AND deleted_at IS NULL",
        )
        .bind(Utc::now())
        .bind(todo_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
