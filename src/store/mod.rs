//! Persistence for users and todos.
//!
//! `Store` is an explicitly constructed handle around an sqlx SQLite pool. It is
//! built once in `main` and handed to handlers through `AppState`; nothing in the
//! crate keeps a global connection.
//!
//! Reads never return soft-deleted rows. Every todo statement carries the owner id
//! in its `WHERE` clause, so "exists but belongs to someone else" and "does not
//! exist" are the same miss.

mod todos;
mod users;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

/// Upper bound on waiting for a pooled connection or a database lock.
const STATEMENT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens the database at `database_url` and applies pending migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(STATEMENT_TIMEOUT);

        // Connections are never recycled so that `sqlite::memory:` keeps its data.
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .acquire_timeout(STATEMENT_TIMEOUT)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// A private, empty database that lives as long as this store.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        Self::connect("sqlite::memory:", 1).await
    }

    /// Round-trips a trivial statement.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Turns a unique-index violation into `AppError::Conflict`; everything else stays internal.
fn conflict_on_unique(error: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return AppError::Conflict(message.to_string());
        }
    }
    error.into()
}
