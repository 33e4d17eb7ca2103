use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A todo item as stored in the database and returned by the API.
/// The soft-delete tombstone is never selected, so it never leaves the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Todo {
    pub id: i64,
    pub item: String,
    pub completed: bool,
    /// Identifier of the user who owns the todo.
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for `POST /todos`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateTodoRequest {
    /// Must be between 1 and 500 characters.
    #[validate(length(min = 1, max = 500))]
    pub item: String,
    /// `None` when the field was left out of the body.
    pub completed: Option<bool>,
}

impl CreateTodoRequest {
    pub fn completed(&self) -> bool {
        self.completed.unwrap_or(false)
    }
}

/// Payload for `PATCH /todos/{id}`. Every field is optional.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTodoRequest {
    #[validate(length(max = 500))]
    pub item: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateTodoRequest {
    /// The replacement item, if any. An empty string keeps the stored item.
    pub fn item(&self) -> Option<&str> {
        self.item.as_deref().filter(|item| !item.is_empty())
    }
}
