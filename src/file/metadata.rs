//! File metadata types and repository.
//!
//! A metadata row is the authoritative record of a stored file; the bytes
//! themselves live on a chat platform and are located through the
//! `remote_blob_id` / `remote_message_id` pair.

use sqlx::SqlitePool;

use crate::storage::{MimeCategory, Platform};
use crate::{Result, VaultError};

/// Metadata of a stored file.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileMetadata {
    /// Unique file ID (allocated from the id sequence).
    pub id: i64,
    /// Owning user ID.
    pub owner_id: i64,
    /// Current file name.
    pub name: String,
    /// Size in bytes, as reported by the platform.
    pub size: i64,
    /// Content classification.
    #[sqlx(try_from = "String")]
    pub category: MimeCategory,
    /// Platform holding the bytes.
    #[sqlx(try_from = "String")]
    pub platform: Platform,
    /// Platform-side blob identifier.
    pub remote_blob_id: String,
    /// Platform-side message identifier.
    pub remote_message_id: String,
    /// Containing folder (None for root).
    pub folder_id: Option<i64>,
    /// Upload timestamp.
    pub uploaded_at: String,
    /// Last metadata change timestamp.
    pub modified_at: String,
}

/// Data for recording a freshly uploaded file.
#[derive(Debug, Clone)]
pub struct NewFile {
    /// Pre-allocated file ID.
    pub id: i64,
    /// Owning user ID.
    pub owner_id: i64,
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// Content classification.
    pub category: MimeCategory,
    /// Platform holding the bytes.
    pub platform: Platform,
    /// Platform-side blob identifier.
    pub remote_blob_id: String,
    /// Platform-side message identifier.
    pub remote_message_id: String,
    /// Containing folder (None for root).
    pub folder_id: Option<i64>,
}

const FILE_COLUMNS: &str = "id, owner_id, name, size, category, platform, remote_blob_id, \
                            remote_message_id, folder_id, uploaded_at, modified_at";

/// Repository for file metadata operations.
pub struct FileRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FileRepository<'a> {
    /// Create a new FileRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record an uploaded file.
    pub async fn create(&self, file: &NewFile) -> Result<FileMetadata> {
        sqlx::query(
            "INSERT INTO files (id, owner_id, name, size, category, platform,
                                remote_blob_id, remote_message_id, folder_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(file.id)
        .bind(file.owner_id)
        .bind(&file.name)
        .bind(file.size)
        .bind(file.category.as_str())
        .bind(file.platform.as_str())
        .bind(&file.remote_blob_id)
        .bind(&file.remote_message_id)
        .bind(file.folder_id)
        .execute(self.pool)
        .await?;

        self.get_by_id(file.id)
            .await?
            .ok_or_else(|| VaultError::NotFoundOrForbidden("file".to_string()))
    }

    /// Get a file by ID regardless of owner.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<FileMetadata>> {
        let file = sqlx::query_as::<_, FileMetadata>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(file)
    }

    /// Get a file by ID, constrained to an owner.
    ///
    /// Absent and foreign files are indistinguishable to the caller.
    pub async fn get_owned(&self, id: i64, owner_id: i64) -> Result<Option<FileMetadata>> {
        let file = sqlx::query_as::<_, FileMetadata>(&format!(
            "SELECT {FILE_COLUMNS} FROM files WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(file)
    }

    /// List an owner's files in a folder (None lists the root).
    pub async fn list_in_folder(
        &self,
        owner_id: i64,
        folder_id: Option<i64>,
    ) -> Result<Vec<FileMetadata>> {
        let files = match folder_id {
            Some(folder_id) => {
                sqlx::query_as::<_, FileMetadata>(&format!(
                    "SELECT {FILE_COLUMNS} FROM files
                     WHERE owner_id = $1 AND folder_id = $2 ORDER BY name, id"
                ))
                .bind(owner_id)
                .bind(folder_id)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, FileMetadata>(&format!(
                    "SELECT {FILE_COLUMNS} FROM files
                     WHERE owner_id = $1 AND folder_id IS NULL ORDER BY name, id"
                ))
                .bind(owner_id)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(files)
    }

    /// Ids of all files in a folder, regardless of owner filtering above.
    pub async fn ids_in_folder(&self, folder_id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM files WHERE folder_id = $1")
            .bind(folder_id)
            .fetch_all(self.pool)
            .await?;

        Ok(ids)
    }

    /// Rename a file and bump its modified timestamp.
    pub async fn rename(&self, id: i64, new_name: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE files SET name = $1, modified_at = datetime('now') WHERE id = $2",
        )
        .bind(new_name)
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a file row together with its activity rows, atomically.
    ///
    /// Activity entries never outlive their file.
    pub async fn delete_cascade(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM activity_logs WHERE file_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}
