//! User model and repository for ChatVault.
//!
//! Users are not registered directly: identity arrives pre-verified from a
//! chat platform's login flow, and the row is upserted on every login.

use super::DbPool;
use crate::storage::Platform;
use crate::{Result, VaultError};

/// User entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Platform the user logged in through.
    #[sqlx(try_from = "String")]
    pub platform: Platform,
    /// Platform-side user id.
    pub external_id: String,
    /// Platform username / handle.
    pub username: String,
    /// First name (optional).
    pub first_name: Option<String>,
    /// Last name (optional).
    pub last_name: Option<String>,
    /// Last successful login timestamp.
    pub auth_date: String,
    /// Row creation timestamp.
    pub created_at: String,
}

impl User {
    /// Human-readable display name: full name when present, else the handle.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            _ => self.username.clone(),
        }
    }
}

/// Verified identity tuple used for login upserts.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Platform the identity was verified by.
    pub platform: Platform,
    /// Platform-side user id.
    pub external_id: String,
    /// Platform username / handle.
    pub username: String,
    /// First name (optional).
    pub first_name: Option<String>,
    /// Last name (optional).
    pub last_name: Option<String>,
}

const USER_COLUMNS: &str =
    "id, platform, external_id, username, first_name, last_name, auth_date, created_at";

/// Repository for user operations.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a user on login.
    ///
    /// An existing `(platform, external_id)` row keeps its id; name parts
    /// and `auth_date` are refreshed from the incoming identity.
    pub async fn upsert(&self, new_user: &NewUser) -> Result<User> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (platform, external_id, username, first_name, last_name)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT(platform, external_id) DO UPDATE SET
                 username = excluded.username,
                 first_name = excluded.first_name,
                 last_name = excluded.last_name,
                 auth_date = datetime('now')
             RETURNING id",
        )
        .bind(new_user.platform.as_str())
        .bind(&new_user.external_id)
        .bind(&new_user.username)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| VaultError::NotFoundOrForbidden("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }
}
