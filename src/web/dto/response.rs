//! Response DTOs for the Web API.

use serde::Serialize;

use crate::datetime::to_rfc3339;
use crate::db::User;
use crate::file::{ActivityEntry, FileMetadata, Folder, FolderListing};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Opaque session token.
    pub token: String,
    /// Session expiry timestamp.
    pub expires_at: String,
    /// User information.
    pub user: UserInfo,
}

/// User information in responses.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: i64,
    /// Login platform.
    pub platform: String,
    /// Platform-side user identifier.
    pub external_id: String,
    /// Platform username.
    pub username: String,
    /// Display name assembled from the profile fields.
    pub display_name: String,
}

impl From<User> for UserInfo {
    fn from(user: User) -> Self {
        let display_name = user.display_name();
        Self {
            id: user.id,
            platform: user.platform.as_str().to_string(),
            external_id: user.external_id,
            username: user.username,
            display_name,
        }
    }
}

/// File metadata in responses.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// File ID.
    pub id: i64,
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// Content classification ("photo", "video", or "document").
    pub category: String,
    /// Platform holding the bytes.
    pub platform: String,
    /// Containing folder (absent for root).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<i64>,
    /// Upload timestamp.
    pub uploaded_at: String,
    /// Last metadata change timestamp.
    pub modified_at: String,
}

impl From<FileMetadata> for FileResponse {
    fn from(metadata: FileMetadata) -> Self {
        Self {
            id: metadata.id,
            name: metadata.name,
            size: metadata.size,
            category: metadata.category.as_str().to_string(),
            platform: metadata.platform.as_str().to_string(),
            folder_id: metadata.folder_id,
            uploaded_at: to_rfc3339(&metadata.uploaded_at),
            modified_at: to_rfc3339(&metadata.modified_at),
        }
    }
}

/// Folder in responses.
#[derive(Debug, Serialize)]
pub struct FolderResponse {
    /// Folder ID.
    pub id: i64,
    /// Folder name.
    pub name: String,
    /// Parent folder (absent for root-level folders).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    /// Creation timestamp.
    pub created_at: String,
    /// Last rename timestamp.
    pub modified_at: String,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            parent_id: folder.parent_id,
            created_at: to_rfc3339(&folder.created_at),
            modified_at: to_rfc3339(&folder.modified_at),
        }
    }
}

/// One level of the folder hierarchy.
#[derive(Debug, Serialize)]
pub struct FolderListingResponse {
    /// The listed folder (absent for the root level).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<FolderResponse>,
    /// Child folders.
    pub folders: Vec<FolderResponse>,
    /// Files at this level.
    pub files: Vec<FileResponse>,
}

impl From<FolderListing> for FolderListingResponse {
    fn from(listing: FolderListing) -> Self {
        Self {
            folder: listing.folder.map(FolderResponse::from),
            folders: listing.folders.into_iter().map(Into::into).collect(),
            files: listing.files.into_iter().map(Into::into).collect(),
        }
    }
}

/// One activity log entry.
#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    /// Entry ID.
    pub id: i64,
    /// Activity kind ("upload", "download", "rename", or "share").
    pub kind: String,
    /// Human-readable description.
    pub detail: String,
    /// When it happened.
    pub created_at: String,
}

impl From<ActivityEntry> for ActivityResponse {
    fn from(entry: ActivityEntry) -> Self {
        Self {
            id: entry.id,
            kind: entry.kind.as_str().to_string(),
            detail: entry.detail,
            created_at: to_rfc3339(&entry.created_at),
        }
    }
}

/// A minted share link.
#[derive(Debug, Serialize)]
pub struct ShareLinkResponse {
    /// Opaque link token.
    pub token: String,
    /// Public resolution URL.
    pub url: String,
    /// Link expiry timestamp.
    pub expires_at: String,
}

/// Result of a delete operation.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Number of rows removed.
    pub deleted: u64,
}
