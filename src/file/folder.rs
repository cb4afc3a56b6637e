//! Folder types and repository.

use sqlx::SqlitePool;

use crate::Result;

/// A folder in a user's hierarchy.
///
/// Sibling folders may share a name; ids are the only identity.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Folder {
    /// Unique folder ID (allocated from the id sequence).
    pub id: i64,
    /// Owning user ID.
    pub owner_id: i64,
    /// Folder name.
    pub name: String,
    /// Parent folder ID (None for root folders).
    pub parent_id: Option<i64>,
    /// When the folder was created.
    pub created_at: String,
    /// Last rename timestamp.
    pub modified_at: String,
}

/// Data for creating a new folder.
#[derive(Debug, Clone)]
pub struct NewFolder {
    /// Pre-allocated folder ID.
    pub id: i64,
    /// Owning user ID.
    pub owner_id: i64,
    /// Folder name.
    pub name: String,
    /// Parent folder ID (None for root folders).
    pub parent_id: Option<i64>,
}

const FOLDER_COLUMNS: &str = "id, owner_id, name, parent_id, created_at, modified_at";

/// Repository for folder operations.
pub struct FolderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FolderRepository<'a> {
    /// Create a new FolderRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new folder.
    pub async fn create(&self, folder: &NewFolder) -> Result<Folder> {
        let created = sqlx::query_as::<_, Folder>(&format!(
            "INSERT INTO folders (id, owner_id, name, parent_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {FOLDER_COLUMNS}"
        ))
        .bind(folder.id)
        .bind(folder.owner_id)
        .bind(&folder.name)
        .bind(folder.parent_id)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Get a folder by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(folder)
    }

    /// Get a folder by ID, constrained to an owner.
    pub async fn get_owned(&self, id: i64, owner_id: i64) -> Result<Option<Folder>> {
        let folder = sqlx::query_as::<_, Folder>(&format!(
            "SELECT {FOLDER_COLUMNS} FROM folders WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(folder)
    }

    /// List an owner's child folders of a parent (None lists the root).
    pub async fn list_children(
        &self,
        owner_id: i64,
        parent_id: Option<i64>,
    ) -> Result<Vec<Folder>> {
        let folders = match parent_id {
            Some(parent_id) => {
                sqlx::query_as::<_, Folder>(&format!(
                    "SELECT {FOLDER_COLUMNS} FROM folders
                     WHERE owner_id = $1 AND parent_id = $2 ORDER BY name, id"
                ))
                .bind(owner_id)
                .bind(parent_id)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Folder>(&format!(
                    "SELECT {FOLDER_COLUMNS} FROM folders
                     WHERE owner_id = $1 AND parent_id IS NULL ORDER BY name, id"
                ))
                .bind(owner_id)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(folders)
    }

    /// Ids of all direct child folders of a folder.
    pub async fn child_ids(&self, parent_id: i64) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM folders WHERE parent_id = $1")
            .bind(parent_id)
            .fetch_all(self.pool)
            .await?;

        Ok(ids)
    }

    /// Rename a folder and bump its modified timestamp.
    pub async fn rename(&self, id: i64, new_name: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE folders SET name = $1, modified_at = datetime('now') WHERE id = $2",
        )
        .bind(new_name)
        .bind(id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a folder row by ID.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM folders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
