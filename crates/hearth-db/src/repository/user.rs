//! # User Repository
//!
//! Minimal account storage. Authentication lives outside this workspace;
//! rows here exist so every entity has an owner to scope queries by.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use hearth_core::types::User;

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a user.
    ///
    /// Returns `DbError::UniqueViolation` when the email is taken.
    pub async fn create(&self, email: &str, display_name: Option<&str>) -> DbResult<User> {
        debug!(email, "Creating user");

        let now = Utc::now();
        let result =
            sqlx::query("INSERT INTO users (email, display_name, created_at) VALUES (?1, ?2, ?3)")
                .bind(email)
                .bind(display_name)
                .bind(now)
                .execute(&self.pool)
                .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
            created_at: now,
        })
    }

    /// Gets a user by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<User>> {
        let user: Option<User> = sqlx::query_as(
            "SELECT id, email, display_name, created_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user: Option<User> = sqlx::query_as(
            "SELECT id, email, display_name, created_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
