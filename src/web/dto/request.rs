//! Request DTOs for the Web API.

use serde::Deserialize;

/// Login request carrying a platform-verified identity.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Platform name ("telegram" or "discord").
    pub platform: String,
    /// Platform-side user identifier.
    pub external_id: String,
    /// Platform username.
    pub username: String,
    /// Optional first name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Optional last name.
    #[serde(default)]
    pub last_name: Option<String>,
}

/// File rename request.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    /// New file name.
    pub new_name: String,
}

/// Batch of file ids for bulk operations.
#[derive(Debug, Deserialize)]
pub struct FileIdsRequest {
    /// Target file ids.
    pub file_ids: Vec<i64>,
}

/// Folder creation request.
#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: String,
    /// Parent folder id (absent for a root-level folder).
    #[serde(default)]
    pub parent_id: Option<i64>,
}

/// Folder rename request.
#[derive(Debug, Deserialize)]
pub struct RenameFolderRequest {
    /// New folder name.
    pub new_name: String,
}
