//! Time-limited public share links.
//!
//! A link is a bearer capability: resolving it needs no session and is not
//! attributed to anyone in the activity log. The file name is snapshotted
//! at share time, so a later rename does not retitle an outstanding link.

use uuid::Uuid;

use crate::datetime::{expiry_in_minutes, is_past};
use crate::db::{DbPool, SequenceRepository, UserRepository};
use crate::file::activity::{ActivityKind, ActivityRepository};
use crate::file::catalog::FileCatalog;
use crate::file::metadata::{FileMetadata, FileRepository};
use crate::{Result, VaultError};

pub(crate) const SHARE_SEQUENCE: &str = "share";

/// A minted share link.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShareLink {
    /// Link ID.
    pub id: i64,
    /// Shared file ID.
    pub file_id: i64,
    /// Owner of the file at share time.
    pub owner_id: i64,
    /// File name snapshot.
    pub file_name: String,
    /// Opaque token (UUID v4).
    pub token: String,
    /// Creation timestamp.
    pub created_at: String,
    /// Expiration timestamp.
    pub expires_at: String,
}

/// Resolved content of a share link.
#[derive(Debug)]
pub struct SharedFile {
    /// File name as it was when the link was minted.
    pub file_name: String,
    /// Current file metadata.
    pub metadata: FileMetadata,
    /// File content.
    pub content: Vec<u8>,
}

/// Share link minting and resolution.
#[derive(Clone)]
pub struct ShareLinkService {
    pool: DbPool,
    catalog: FileCatalog,
    ttl_minutes: i64,
    public_base_url: String,
}

impl ShareLinkService {
    /// Create a new service.
    pub fn new(
        pool: DbPool,
        catalog: FileCatalog,
        ttl_minutes: i64,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            pool,
            catalog,
            ttl_minutes,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Mint a link for an owned file.
    pub async fn create(&self, owner: &crate::db::User, file_id: i64) -> Result<ShareLink> {
        let metadata = self.catalog.get_owned(owner, file_id).await?;

        let id = SequenceRepository::new(&self.pool)
            .next(SHARE_SEQUENCE)
            .await?;
        let token = Uuid::new_v4().to_string();
        let expires_at = expiry_in_minutes(self.ttl_minutes);

        let link = sqlx::query_as::<_, ShareLink>(
            "INSERT INTO share_links (id, file_id, owner_id, file_name, token, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, file_id, owner_id, file_name, token, created_at, expires_at",
        )
        .bind(id)
        .bind(file_id)
        .bind(owner.id)
        .bind(&metadata.name)
        .bind(&token)
        .bind(&expires_at)
        .fetch_one(&self.pool)
        .await?;

        ActivityRepository::new(&self.pool)
            .log(
                file_id,
                owner.id,
                ActivityKind::Share,
                &format!("Shared file {}", metadata.name),
            )
            .await?;

        Ok(link)
    }

    /// Public URL for a token.
    pub fn share_url(&self, token: &str) -> String {
        format!("{}/api/files/share/{}", self.public_base_url, token)
    }

    /// Resolve a token to file content.
    ///
    /// Works without a session. A link stays resolvable any number of times
    /// until it expires. An unknown token and a link whose backing file is
    /// gone read the same.
    pub async fn resolve(&self, token: &str) -> Result<SharedFile> {
        let link = self
            .get_by_token(token)
            .await?
            .ok_or(VaultError::LinkNotFound)?;

        if is_past(&link.expires_at) {
            return Err(VaultError::LinkExpired);
        }

        let metadata = FileRepository::new(&self.pool)
            .get_by_id(link.file_id)
            .await?
            .ok_or(VaultError::LinkNotFound)?;

        let owner = UserRepository::new(&self.pool)
            .get_by_id(metadata.owner_id)
            .await?
            .ok_or(VaultError::LinkNotFound)?;

        let content = self.catalog.fetch_content(&owner, &metadata).await?;

        Ok(SharedFile {
            file_name: link.file_name,
            metadata,
            content,
        })
    }

    /// Delete expired links (cleanup).
    pub async fn cleanup_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM share_links WHERE expires_at < datetime('now')")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<ShareLink>> {
        let link = sqlx::query_as::<_, ShareLink>(
            "SELECT id, file_id, owner_id, file_name, token, created_at, expires_at
             FROM share_links WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }
}

/// Backdate helper shared by tests.
#[cfg(test)]
pub(crate) async fn force_expire(pool: &DbPool, token: &str) {
    sqlx::query("UPDATE share_links SET expires_at = '2000-01-01 00:00:00' WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await
        .unwrap();
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::{NewUser, User, UserRepository};
    use crate::file::catalog::UploadRequest;
    use crate::storage::{MemoryStore, Platform, StorageRouter};
    use crate::Database;

    async fn setup() -> (Database, FileCatalog, ShareLinkService, User) {
        let db = Database::open_in_memory().await.unwrap();
        let user = UserRepository::new(db.pool())
            .upsert(&NewUser {
                platform: Platform::Telegram,
                external_id: "1001".to_string(),
                username: "alice".to_string(),
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap();

        let mut router = StorageRouter::new();
        router.register(Arc::new(MemoryStore::new(Platform::Telegram)));
        let catalog = FileCatalog::new(db.pool().clone(), router);
        let shares = ShareLinkService::new(
            db.pool().clone(),
            catalog.clone(),
            30,
            "https://vault.example.com/",
        );
        (db, catalog, shares, user)
    }

    async fn upload(catalog: &FileCatalog, user: &User, name: &str) -> i64 {
        catalog
            .upload(
                user,
                UploadRequest {
                    filename: name.to_string(),
                    content: b"shared content".to_vec(),
                    mime_type: None,
                    platform: None,
                    folder_id: None,
                },
            )
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_and_resolve_twice() {
        let (_db, catalog, shares, user) = setup().await;
        let file_id = upload(&catalog, &user, "doc.txt").await;

        let link = shares.create(&user, file_id).await.unwrap();
        assert_eq!(link.file_name, "doc.txt");

        // A link resolves any number of times while valid
        for _ in 0..2 {
            let shared = shares.resolve(&link.token).await.unwrap();
            assert_eq!(shared.file_name, "doc.txt");
            assert_eq!(shared.content, b"shared content");
        }
    }

    #[tokio::test]
    async fn test_link_ids_come_from_counter() {
        let (db, catalog, shares, user) = setup().await;
        let file_id = upload(&catalog, &user, "doc.txt").await;

        let first = shares.create(&user, file_id).await.unwrap();
        let second = shares.create(&user, file_id).await.unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);

        let counter: i64 =
            sqlx::query_scalar("SELECT value FROM counters WHERE kind = $1")
                .bind(SHARE_SEQUENCE)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(counter, 2);
    }

    #[tokio::test]
    async fn test_share_url() {
        let (_db, catalog, shares, user) = setup().await;
        let file_id = upload(&catalog, &user, "doc.txt").await;

        let link = shares.create(&user, file_id).await.unwrap();
        assert_eq!(
            shares.share_url(&link.token),
            format!("https://vault.example.com/api/files/share/{}", link.token)
        );
    }

    #[tokio::test]
    async fn test_snapshot_survives_rename() {
        let (_db, catalog, shares, user) = setup().await;
        let file_id = upload(&catalog, &user, "before.txt").await;

        let link = shares.create(&user, file_id).await.unwrap();
        catalog.rename(&user, file_id, "after.txt").await.unwrap();

        let shared = shares.resolve(&link.token).await.unwrap();
        assert_eq!(shared.file_name, "before.txt");
        assert_eq!(shared.metadata.name, "after.txt");
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let (_db, _catalog, shares, _user) = setup().await;

        let err = shares.resolve("no-such-token").await.unwrap_err();
        assert!(matches!(err, VaultError::LinkNotFound));
    }

    #[tokio::test]
    async fn test_expired_link() {
        let (db, catalog, shares, user) = setup().await;
        let file_id = upload(&catalog, &user, "doc.txt").await;

        let link = shares.create(&user, file_id).await.unwrap();
        force_expire(db.pool(), &link.token).await;

        let err = shares.resolve(&link.token).await.unwrap_err();
        assert!(matches!(err, VaultError::LinkExpired));
    }

    #[tokio::test]
    async fn test_link_to_deleted_file_reads_as_not_found() {
        let (_db, catalog, shares, user) = setup().await;
        let file_id = upload(&catalog, &user, "doc.txt").await;

        let link = shares.create(&user, file_id).await.unwrap();
        catalog.delete_many(&user, &[file_id]).await.unwrap();

        let err = shares.resolve(&link.token).await.unwrap_err();
        assert!(matches!(err, VaultError::LinkNotFound));
    }

    #[tokio::test]
    async fn test_create_logs_share_activity() {
        let (_db, catalog, shares, user) = setup().await;
        let file_id = upload(&catalog, &user, "doc.txt").await;

        shares.create(&user, file_id).await.unwrap();

        let activity = catalog.activity(&user, file_id).await.unwrap();
        assert_eq!(activity[0].kind, ActivityKind::Share);
        assert_eq!(activity[0].detail, "Shared file doc.txt");
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let (db, catalog, shares, user) = setup().await;
        let file_id = upload(&catalog, &user, "doc.txt").await;

        let stale = shares.create(&user, file_id).await.unwrap();
        let fresh = shares.create(&user, file_id).await.unwrap();
        force_expire(db.pool(), &stale.token).await;

        let removed = shares.cleanup_expired().await.unwrap();
        assert_eq!(removed, 1);

        assert!(matches!(
            shares.resolve(&stale.token).await.unwrap_err(),
            VaultError::LinkNotFound
        ));
        assert!(shares.resolve(&fresh.token).await.is_ok());
    }
}
