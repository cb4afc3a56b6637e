//! Session repository.
//!
//! Sessions are opaque bearer tokens stored server-side, so "logout
//! everywhere" is a plain DELETE and revocation takes effect immediately.

use super::DbPool;
use crate::Result;

const SQL_NOW: &str = "datetime('now')";

/// Session entity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    /// Opaque token string (UUID v4).
    pub token: String,
    /// User ID.
    pub user_id: i64,
    /// Creation timestamp.
    pub created_at: String,
    /// Expiration timestamp.
    pub expires_at: String,
}

/// New session for creation.
pub struct NewSession {
    /// Opaque token string.
    pub token: String,
    /// User ID.
    pub user_id: i64,
    /// Expiration timestamp.
    pub expires_at: String,
}

/// Repository for session operations.
pub struct SessionRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new session.
    pub async fn create(&self, new_session: &NewSession) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)
             RETURNING token, user_id, created_at, expires_at",
        )
        .bind(&new_session.token)
        .bind(new_session.user_id)
        .bind(&new_session.expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(session)
    }

    /// Get a session by token string.
    ///
    /// Expiry is not checked here; the caller decides how a stale row is
    /// reported.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<Session>> {
        let result = sqlx::query_as::<_, Session>(
            "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    /// Delete all sessions for a user (logout everywhere).
    pub async fn delete_all_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete expired sessions (cleanup).
    pub async fn cleanup_expired(&self) -> Result<u64> {
        let sql = format!("DELETE FROM sessions WHERE expires_at < {}", SQL_NOW);
        let result = sqlx::query(&sql).execute(self.pool).await?;

        Ok(result.rows_affected())
    }
}
