use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::User;

use super::row_helpers::map_user_row;

/// User database operations
pub struct UserRepo;

impl UserRepo {
    pub async fn get(pool: &Pool<Sqlite>, id: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.as_ref().map(map_user_row))
    }

    pub async fn get_by_email(pool: &Pool<Sqlite>, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE lower(email) = lower(?)",
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(row.as_ref().map(map_user_row))
    }

    /// Create a user. An empty `password_hash` means the user cannot log in.
    pub async fn create(
        pool: &Pool<Sqlite>,
        id: &str,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> Result<User> {
        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(Utc::now())
        .execute(pool)
        .await?;

        Self::get(pool, id)
            .await?
            .context("User not found after creation")
    }
}
