//! User repository
//!
//! Database operations for users.
//!
//! This module provides:
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite and MySQL

use crate::db::DynDatabasePool;
use crate::models::{User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::str::FromStr;
use std::sync::Arc;

const USER_COLUMNS: &str =
    "id, email, password_hash, first_name, last_name, role, is_active, is_system, created_at, updated_at";

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Get user by email (case-insensitive)
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// First user with the role, oldest account first
    async fn find_first_by_role(&self, role: UserRole) -> Result<Option<User>>;

    /// Replace a user's password hash
    async fn update_password(&self, id: &str, password_hash: &str) -> Result<()>;

    /// Count total users
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based user repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

macro_rules! user_from_row {
    ($row:expr) => {{
        let row = $row;
        let role: String = row.try_get("role")?;
        User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            role: UserRole::from_str(&role)?,
            is_active: row.try_get("is_active")?,
            is_system: row.try_get("is_system")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        }
    }};
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        on_pool!(self.pool, |conn| {
            sqlx::query(
                r#"
                INSERT INTO users (id, email, password_hash, first_name, last_name, role,
                    is_active, is_system, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&user.id)
            .bind(user.email.to_lowercase())
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.role.to_string())
            .bind(user.is_active)
            .bind(user.is_system)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(conn)
            .await
            .context("Failed to create user")?;
        });

        let mut created = user.clone();
        created.email = user.email.to_lowercase();
        Ok(created)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        on_pool!(self.pool, |conn| {
            let row = sqlx::query(&sql)
                .bind(id)
                .fetch_optional(conn)
                .await
                .context("Failed to get user by ID")?;
            match row {
                Some(row) => Ok(Some(user_from_row!(&row))),
                None => Ok(None),
            }
        })
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
        let email = email.trim().to_lowercase();
        on_pool!(self.pool, |conn| {
            let row = sqlx::query(&sql)
                .bind(&email)
                .fetch_optional(conn)
                .await
                .context("Failed to get user by email")?;
            match row {
                Some(row) => Ok(Some(user_from_row!(&row))),
                None => Ok(None),
            }
        })
    }

    async fn find_first_by_role(&self, role: UserRole) -> Result<Option<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE role = ? ORDER BY created_at ASC, id ASC LIMIT 1",
            USER_COLUMNS
        );
        on_pool!(self.pool, |conn| {
            let row = sqlx::query(&sql)
                .bind(role.to_string())
                .fetch_optional(conn)
                .await
                .context("Failed to find user by role")?;
            match row {
                Some(row) => Ok(Some(user_from_row!(&row))),
                None => Ok(None),
            }
        })
    }

    async fn update_password(&self, id: &str, password_hash: &str) -> Result<()> {
        on_pool!(self.pool, |conn| {
            sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
                .bind(password_hash)
                .bind(Utc::now())
                .bind(id)
                .execute(conn)
                .await
                .context("Failed to update user password")?;
        });
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        on_pool!(self.pool, |conn| {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
                .fetch_one(conn)
                .await
                .context("Failed to count users")?;
            Ok(count)
        })
    }
}
