//! Session issuing and validation.
//!
//! There are no passwords. A login presents an identity the platform layer
//! has already verified, the user row is created or refreshed from it, and
//! an opaque session token is minted. Tokens live server-side, so
//! revocation is immediate.

use uuid::Uuid;

use crate::datetime::{expiry_in_minutes, is_past};
use crate::db::{DbPool, NewSession, NewUser, Session, SessionRepository, User, UserRepository};
use crate::storage::Platform;
use crate::{Result, VaultError};

/// A platform identity that has already been verified upstream.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Platform the identity belongs to.
    pub platform: Platform,
    /// Platform-side user identifier.
    pub external_id: String,
    /// Platform username.
    pub username: String,
    /// Optional first name.
    pub first_name: Option<String>,
    /// Optional last name.
    pub last_name: Option<String>,
}

/// Session manager.
#[derive(Clone)]
pub struct SessionService {
    pool: DbPool,
    duration_minutes: i64,
}

impl SessionService {
    /// Create a new service.
    pub fn new(pool: DbPool, duration_minutes: i64) -> Self {
        Self {
            pool,
            duration_minutes,
        }
    }

    /// Log a verified identity in.
    ///
    /// Creates the user on first contact, refreshes the profile fields on
    /// every later login, and mints a fresh session either way.
    pub async fn login(&self, identity: &VerifiedIdentity) -> Result<(User, Session)> {
        if identity.external_id.trim().is_empty() {
            return Err(VaultError::InvalidInput("external id is empty".to_string()));
        }
        if identity.username.trim().is_empty() {
            return Err(VaultError::InvalidInput("username is empty".to_string()));
        }

        let user = UserRepository::new(&self.pool)
            .upsert(&NewUser {
                platform: identity.platform,
                external_id: identity.external_id.clone(),
                username: identity.username.clone(),
                first_name: identity.first_name.clone(),
                last_name: identity.last_name.clone(),
            })
            .await?;

        let session = self.issue(&user).await?;
        Ok((user, session))
    }

    /// Mint a session for an existing user.
    pub async fn issue(&self, user: &User) -> Result<Session> {
        SessionRepository::new(&self.pool)
            .create(&NewSession {
                token: Uuid::new_v4().to_string(),
                user_id: user.id,
                expires_at: expiry_in_minutes(self.duration_minutes),
            })
            .await
    }

    /// Resolve a bearer token to its user.
    ///
    /// An unknown token and an expired one are reported differently: the
    /// former was never ours, the latter asks the client to log in again.
    pub async fn validate(&self, token: &str) -> Result<User> {
        let session = SessionRepository::new(&self.pool)
            .get_by_token(token)
            .await?
            .ok_or_else(|| VaultError::Unauthorized("unknown session token".to_string()))?;

        if is_past(&session.expires_at) {
            return Err(VaultError::SessionExpired);
        }

        UserRepository::new(&self.pool)
            .get_by_id(session.user_id)
            .await?
            .ok_or_else(|| VaultError::Unauthorized("session user no longer exists".to_string()))
    }

    /// Revoke every session of a user (logout everywhere).
    pub async fn revoke_all(&self, user_id: i64) -> Result<u64> {
        SessionRepository::new(&self.pool)
            .delete_all_for_user(user_id)
            .await
    }

    /// Delete expired sessions (cleanup).
    pub async fn cleanup_expired(&self) -> Result<u64> {
        SessionRepository::new(&self.pool).cleanup_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    fn identity(external_id: &str, username: &str) -> VerifiedIdentity {
        VerifiedIdentity {
            platform: Platform::Telegram,
            external_id: external_id.to_string(),
            username: username.to_string(),
            first_name: Some("Alice".to_string()),
            last_name: None,
        }
    }

    async fn setup() -> (Database, SessionService) {
        let db = Database::open_in_memory().await.unwrap();
        let service = SessionService::new(db.pool().clone(), 60);
        (db, service)
    }

    #[tokio::test]
    async fn test_login_creates_user_and_session() {
        let (_db, service) = setup().await;

        let (user, session) = service.login(&identity("1001", "alice")).await.unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(session.user_id, user.id);

        let validated = service.validate(&session.token).await.unwrap();
        assert_eq!(validated.id, user.id);
    }

    #[tokio::test]
    async fn test_login_twice_reuses_user() {
        let (_db, service) = setup().await;

        let (first, _) = service.login(&identity("1001", "alice")).await.unwrap();
        let (second, _) = service.login(&identity("1001", "alice2")).await.unwrap();

        assert_eq!(first.id, second.id);
        // Profile fields refresh on every login
        assert_eq!(second.username, "alice2");
    }

    #[tokio::test]
    async fn test_login_rejects_blank_identity() {
        let (_db, service) = setup().await;

        let err = service.login(&identity("  ", "alice")).await.unwrap_err();
        assert!(matches!(err, VaultError::InvalidInput(_)));

        let err = service.login(&identity("1001", "")).await.unwrap_err();
        assert!(matches!(err, VaultError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_validate_unknown_token() {
        let (_db, service) = setup().await;

        let err = service.validate("no-such-token").await.unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_validate_expired_token() {
        let (db, service) = setup().await;

        let (_, session) = service.login(&identity("1001", "alice")).await.unwrap();
        sqlx::query("UPDATE sessions SET expires_at = '2000-01-01 00:00:00' WHERE token = $1")
            .bind(&session.token)
            .execute(db.pool())
            .await
            .unwrap();

        let err = service.validate(&session.token).await.unwrap_err();
        assert!(matches!(err, VaultError::SessionExpired));
    }

    #[tokio::test]
    async fn test_revoke_all_logs_out_everywhere() {
        let (_db, service) = setup().await;

        let (user, first) = service.login(&identity("1001", "alice")).await.unwrap();
        let second = service.issue(&user).await.unwrap();

        let revoked = service.revoke_all(user.id).await.unwrap();
        assert_eq!(revoked, 2);

        assert!(service.validate(&first.token).await.is_err());
        assert!(service.validate(&second.token).await.is_err());
    }

    #[tokio::test]
    async fn test_cleanup_only_removes_expired() {
        let (db, service) = setup().await;

        let (user, stale) = service.login(&identity("1001", "alice")).await.unwrap();
        let fresh = service.issue(&user).await.unwrap();
        sqlx::query("UPDATE sessions SET expires_at = '2000-01-01 00:00:00' WHERE token = $1")
            .bind(&stale.token)
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(service.cleanup_expired().await.unwrap(), 1);
        assert!(service.validate(&fresh.token).await.is_ok());
    }
}
