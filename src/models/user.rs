use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::Todo;

/// Public view of an account. The password hash is not part of this type.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What login needs from the credential store, and nothing else.
#[derive(FromRow)]
pub struct UserCredentials {
    pub id: i64,
    pub password_hash: String,
}

/// `GET /users/me`: the account together with its live todos.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub todos: Vec<Todo>,
}

/// Payload for `PATCH /users/me`. Provided fields follow the registration rules.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "crate::auth::USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}
