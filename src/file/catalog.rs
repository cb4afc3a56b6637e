//! File catalog: high-level file operations.
//!
//! The catalog owns the invariant that metadata is only written after the
//! remote upload succeeded, and that a file row and its activity rows are
//! removed together.

use tracing::{error, warn};

use crate::db::{DbPool, SequenceRepository, User};
use crate::storage::{DeleteOutcome, MimeCategory, Platform, RemoteHandle, StorageRouter};
use crate::{Result, VaultError};

use super::activity::{ActivityEntry, ActivityKind, ActivityRepository};
use super::folder::FolderRepository;
use super::metadata::{FileMetadata, FileRepository, NewFile};

/// Sequence kind for file ids.
pub(crate) const FILE_SEQUENCE: &str = "file";

/// Request data for a file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename.
    pub filename: String,
    /// File content.
    pub content: Vec<u8>,
    /// MIME type as declared by the client (guessed from the filename
    /// when absent).
    pub mime_type: Option<String>,
    /// Explicit target platform (defaults to the owner's login platform).
    pub platform: Option<Platform>,
    /// Folder to place the file in (None for root).
    pub folder_id: Option<i64>,
}

/// Result of a file download.
#[derive(Debug)]
pub struct DownloadResult {
    /// File metadata.
    pub metadata: FileMetadata,
    /// File content.
    pub content: Vec<u8>,
}

/// High-level file operations over the metadata store and storage backends.
#[derive(Clone)]
pub struct FileCatalog {
    pool: DbPool,
    router: StorageRouter,
}

impl FileCatalog {
    /// Create a new catalog.
    pub fn new(pool: DbPool, router: StorageRouter) -> Self {
        Self { pool, router }
    }

    /// Upload a file on behalf of its owner.
    ///
    /// The platform is the explicit request tag when present, otherwise the
    /// owner's login platform. Oversized payloads are rejected before any
    /// remote call.
    pub async fn upload(&self, owner: &User, request: UploadRequest) -> Result<FileMetadata> {
        if request.filename.trim().is_empty() {
            return Err(VaultError::InvalidInput("filename is empty".to_string()));
        }

        let platform = request.platform.unwrap_or(owner.platform);
        let backend = self.router.get(platform)?;

        // A target folder must exist and belong to the owner
        if let Some(folder_id) = request.folder_id {
            FolderRepository::new(&self.pool)
                .get_owned(folder_id, owner.id)
                .await?
                .ok_or_else(|| VaultError::NotFoundOrForbidden("folder".to_string()))?;
        }

        let size = request.content.len() as u64;
        let limit = backend.max_upload_size();
        if size > limit {
            return Err(VaultError::PayloadTooLarge { size, limit });
        }

        let mime = request.mime_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&request.filename)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });
        let category = MimeCategory::classify(&mime);

        let receipt = backend
            .upload(
                &owner.external_id,
                &request.content,
                &request.filename,
                category,
            )
            .await?;

        // Remote success first, metadata second; the id is allocated only
        // once there is something to record.
        let id = SequenceRepository::new(&self.pool).next(FILE_SEQUENCE).await?;
        let metadata = FileRepository::new(&self.pool)
            .create(&NewFile {
                id,
                owner_id: owner.id,
                name: request.filename.clone(),
                size: receipt.size as i64,
                category,
                platform,
                remote_blob_id: receipt.blob_id,
                remote_message_id: receipt.message_id,
                folder_id: request.folder_id,
            })
            .await?;

        ActivityRepository::new(&self.pool)
            .log(
                id,
                owner.id,
                ActivityKind::Upload,
                &format!("Uploaded file: {}", request.filename),
            )
            .await?;

        Ok(metadata)
    }

    /// Download a file's content.
    ///
    /// The download activity entry is written from a spawned task so a slow
    /// or failing metadata store never delays the response.
    pub async fn download(&self, owner: &User, file_id: i64) -> Result<DownloadResult> {
        let metadata = self.get_owned(owner, file_id).await?;
        let content = self.fetch_content(owner, &metadata).await?;

        let pool = self.pool.clone();
        let name = metadata.name.clone();
        let user_id = owner.id;
        tokio::spawn(async move {
            let result = ActivityRepository::new(&pool)
                .log(
                    file_id,
                    user_id,
                    ActivityKind::Download,
                    &format!("Downloaded file: {name}"),
                )
                .await;
            if let Err(e) = result {
                error!("failed to log download of file {file_id}: {e}");
            }
        });

        Ok(DownloadResult { metadata, content })
    }

    /// Fetch a file's bytes from its backend without any activity logging.
    ///
    /// `owner_address` comes from the passed user, which must be the file's
    /// owner. Used by downloads, share resolution and zip packaging.
    pub(crate) async fn fetch_content(
        &self,
        owner: &User,
        metadata: &FileMetadata,
    ) -> Result<Vec<u8>> {
        let backend = self.router.get(metadata.platform)?;
        backend
            .download(&RemoteHandle {
                owner_address: owner.external_id.clone(),
                blob_id: metadata.remote_blob_id.clone(),
                message_id: metadata.remote_message_id.clone(),
            })
            .await
    }

    /// Rename a file.
    pub async fn rename(
        &self,
        owner: &User,
        file_id: i64,
        new_name: &str,
    ) -> Result<FileMetadata> {
        if new_name.trim().is_empty() {
            return Err(VaultError::InvalidInput("new name is empty".to_string()));
        }

        let metadata = self.get_owned(owner, file_id).await?;

        let repo = FileRepository::new(&self.pool);
        repo.rename(file_id, new_name).await?;

        ActivityRepository::new(&self.pool)
            .log(
                file_id,
                owner.id,
                ActivityKind::Rename,
                &format!("Renamed file from {} to {}", metadata.name, new_name),
            )
            .await?;

        repo.get_by_id(file_id)
            .await?
            .ok_or_else(|| VaultError::NotFoundOrForbidden("file".to_string()))
    }

    /// Delete files, remote blob first, then metadata.
    ///
    /// Processed per id in order. A missing or foreign id aborts the batch;
    /// so does a hard remote failure. A blob that is already gone is benign:
    /// it is logged and cleanup proceeds. Files deleted before an abort stay
    /// deleted.
    pub async fn delete_many(&self, owner: &User, file_ids: &[i64]) -> Result<u64> {
        let files = FileRepository::new(&self.pool);
        let mut deleted = 0u64;

        for &file_id in file_ids {
            let metadata = files
                .get_owned(file_id, owner.id)
                .await?
                .ok_or_else(|| VaultError::NotFoundOrForbidden("file".to_string()))?;

            let backend = self.router.get(metadata.platform)?;
            let outcome = backend
                .delete(&RemoteHandle {
                    owner_address: owner.external_id.clone(),
                    blob_id: metadata.remote_blob_id.clone(),
                    message_id: metadata.remote_message_id.clone(),
                })
                .await?;

            if outcome == DeleteOutcome::AlreadyAbsent {
                warn!(
                    "remote blob for file {} ({}) was already gone",
                    file_id, metadata.name
                );
            }

            files.delete_cascade(file_id).await?;
            deleted += 1;
        }

        Ok(deleted)
    }

    /// Activity entries for a file, newest first.
    pub async fn activity(&self, owner: &User, file_id: i64) -> Result<Vec<ActivityEntry>> {
        self.get_owned(owner, file_id).await?;
        ActivityRepository::new(&self.pool).list_for_file(file_id).await
    }

    /// Owned metadata lookup; absence and foreign ownership read the same.
    pub async fn get_owned(&self, owner: &User, file_id: i64) -> Result<FileMetadata> {
        FileRepository::new(&self.pool)
            .get_owned(file_id, owner.id)
            .await?
            .ok_or_else(|| VaultError::NotFoundOrForbidden("file".to_string()))
    }
}
