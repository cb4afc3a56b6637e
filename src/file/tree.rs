//! Folder hierarchy service.

use tracing::debug;

use crate::db::{DbPool, SequenceRepository, User};
use crate::{Result, VaultError};

use super::folder::{Folder, FolderRepository, NewFolder};
use super::metadata::{FileMetadata, FileRepository};

/// Sequence kind for folder ids.
pub(crate) const FOLDER_SEQUENCE: &str = "folder";

/// Upper bound when walking parent pointers.
///
/// A well-formed tree never gets near this; the guard turns a corrupted
/// parent cycle into an error instead of a hang.
const MAX_FOLDER_DEPTH: usize = 64;

/// Listing of one folder level.
#[derive(Debug)]
pub struct FolderListing {
    /// The listed folder (None for the root level).
    pub folder: Option<Folder>,
    /// Child folders, name-ordered.
    pub folders: Vec<Folder>,
    /// Files at this level, name-ordered.
    pub files: Vec<FileMetadata>,
}

/// Folder hierarchy operations.
#[derive(Clone)]
pub struct FolderTree {
    pool: DbPool,
}

impl FolderTree {
    /// Create a new tree service.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a folder, optionally nested under an owned parent.
    ///
    /// Sibling folders may share a name.
    pub async fn create(
        &self,
        owner: &User,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<Folder> {
        if name.trim().is_empty() {
            return Err(VaultError::InvalidInput("folder name is empty".to_string()));
        }

        let repo = FolderRepository::new(&self.pool);
        if let Some(parent_id) = parent_id {
            repo.get_owned(parent_id, owner.id)
                .await?
                .ok_or_else(|| VaultError::NotFoundOrForbidden("folder".to_string()))?;
        }

        let id = SequenceRepository::new(&self.pool)
            .next(FOLDER_SEQUENCE)
            .await?;
        repo.create(&NewFolder {
            id,
            owner_id: owner.id,
            name: name.to_string(),
            parent_id,
        })
        .await
    }

    /// Rename an owned folder.
    pub async fn rename(&self, owner: &User, folder_id: i64, new_name: &str) -> Result<Folder> {
        if new_name.trim().is_empty() {
            return Err(VaultError::InvalidInput("folder name is empty".to_string()));
        }

        let repo = FolderRepository::new(&self.pool);
        repo.get_owned(folder_id, owner.id)
            .await?
            .ok_or_else(|| VaultError::NotFoundOrForbidden("folder".to_string()))?;

        repo.rename(folder_id, new_name).await?;
        repo.get_by_id(folder_id)
            .await?
            .ok_or_else(|| VaultError::NotFoundOrForbidden("folder".to_string()))
    }

    /// List one level of the hierarchy (None lists the root).
    pub async fn list(&self, owner: &User, folder_id: Option<i64>) -> Result<FolderListing> {
        let repo = FolderRepository::new(&self.pool);

        let folder = match folder_id {
            Some(id) => Some(
                repo.get_owned(id, owner.id)
                    .await?
                    .ok_or_else(|| VaultError::NotFoundOrForbidden("folder".to_string()))?,
            ),
            None => None,
        };

        let folders = repo.list_children(owner.id, folder_id).await?;
        let files = FileRepository::new(&self.pool)
            .list_in_folder(owner.id, folder_id)
            .await?;

        Ok(FolderListing {
            folder,
            folders,
            files,
        })
    }

    /// Delete a folder and everything beneath it.
    ///
    /// The subtree is collected with an explicit worklist and removed
    /// children-before-parent. Only metadata is touched: contained files
    /// lose their rows (and activity entries) but their remote blobs stay
    /// behind. Deleting a missing folder is a no-op returning 0.
    ///
    /// Returns the number of folder and file rows removed.
    pub async fn delete(&self, owner: &User, folder_id: i64) -> Result<u64> {
        let folders = FolderRepository::new(&self.pool);
        let files = FileRepository::new(&self.pool);

        if folders.get_owned(folder_id, owner.id).await?.is_none() {
            return Ok(0);
        }

        // Collect the subtree; parents come before their children.
        let mut ordered = Vec::new();
        let mut stack = vec![folder_id];
        while let Some(id) = stack.pop() {
            ordered.push(id);
            stack.extend(folders.child_ids(id).await?);
        }

        // Remove deepest-first so no child ever outlives its parent's
        // deletion pass. Every step tolerates already-missing rows.
        let mut removed = 0u64;
        for &id in ordered.iter().rev() {
            for file_id in files.ids_in_folder(id).await? {
                if files.delete_cascade(file_id).await? {
                    removed += 1;
                }
            }
            if folders.delete(id).await? {
                removed += 1;
            }
        }

        debug!("deleted folder {folder_id}: {removed} rows removed");
        Ok(removed)
    }

    /// Resolve the chain of folders from the root to a target, inclusive.
    ///
    /// A broken parent link, an ownership mismatch anywhere on the chain,
    /// or a depth over the guard all fail as not-found.
    pub async fn resolve_path(&self, owner: &User, folder_id: i64) -> Result<Vec<Folder>> {
        let repo = FolderRepository::new(&self.pool);

        let mut path = Vec::new();
        let mut current = Some(folder_id);

        while let Some(id) = current {
            if path.len() >= MAX_FOLDER_DEPTH {
                return Err(VaultError::NotFoundOrForbidden("folder path".to_string()));
            }

            let folder = repo
                .get_owned(id, owner.id)
                .await?
                .ok_or_else(|| VaultError::NotFoundOrForbidden("folder".to_string()))?;
            current = folder.parent_id;
            path.push(folder);
        }

        path.reverse();
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewUser, UserRepository};
    use crate::file::metadata::NewFile;
    use crate::storage::{MimeCategory, Platform};
    use crate::Database;

    async fn setup() -> (Database, FolderTree, User, User) {
        let db = Database::open_in_memory().await.unwrap();
        let users = UserRepository::new(db.pool());
        let alice = users
            .upsert(&NewUser {
                platform: Platform::Telegram,
                external_id: "1001".to_string(),
                username: "alice".to_string(),
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap();
        let bob = users
            .upsert(&NewUser {
                platform: Platform::Discord,
                external_id: "2002".to_string(),
                username: "bob".to_string(),
                first_name: None,
                last_name: None,
            })
            .await
            .unwrap();

        let tree = FolderTree::new(db.pool().clone());
        (db, tree, alice, bob)
    }

    async fn place_file(db: &Database, id: i64, owner_id: i64, folder_id: Option<i64>) {
        FileRepository::new(db.pool())
            .create(&NewFile {
                id,
                owner_id,
                name: format!("file-{id}.txt"),
                size: 1,
                category: MimeCategory::Document,
                platform: Platform::Telegram,
                remote_blob_id: format!("blob-{id}"),
                remote_message_id: format!("msg-{id}"),
                folder_id,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (_db, tree, alice, _bob) = setup().await;

        let docs = tree.create(&alice, "Docs", None).await.unwrap();
        let nested = tree.create(&alice, "Nested", Some(docs.id)).await.unwrap();

        let root = tree.list(&alice, None).await.unwrap();
        assert!(root.folder.is_none());
        assert_eq!(root.folders.len(), 1);
        assert_eq!(root.folders[0].name, "Docs");

        let level = tree.list(&alice, Some(docs.id)).await.unwrap();
        assert_eq!(level.folder.as_ref().unwrap().id, docs.id);
        assert_eq!(level.folders.len(), 1);
        assert_eq!(level.folders[0].id, nested.id);
    }

    #[tokio::test]
    async fn test_create_under_foreign_parent_fails() {
        let (_db, tree, alice, bob) = setup().await;

        let docs = tree.create(&alice, "Docs", None).await.unwrap();
        let err = tree
            .create(&bob, "Sneaky", Some(docs.id))
            .await
            .unwrap_err();
        assert!(matches!(err, VaultError::NotFoundOrForbidden(_)));
    }

    #[tokio::test]
    async fn test_create_empty_name_rejected() {
        let (_db, tree, alice, _bob) = setup().await;

        let err = tree.create(&alice, "   ", None).await.unwrap_err();
        assert!(matches!(err, VaultError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_rename() {
        let (_db, tree, alice, bob) = setup().await;

        let docs = tree.create(&alice, "Docs", None).await.unwrap();
        let renamed = tree.rename(&alice, docs.id, "Papers").await.unwrap();
        assert_eq!(renamed.name, "Papers");

        let err = tree.rename(&bob, docs.id, "Stolen").await.unwrap_err();
        assert!(matches!(err, VaultError::NotFoundOrForbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_subtree_children_first() {
        let (db, tree, alice, _bob) = setup().await;

        let root = tree.create(&alice, "Root", None).await.unwrap();
        let child = tree.create(&alice, "Child", Some(root.id)).await.unwrap();
        let grandchild = tree
            .create(&alice, "Grandchild", Some(child.id))
            .await
            .unwrap();

        place_file(&db, 101, alice.id, Some(root.id)).await;
        place_file(&db, 102, alice.id, Some(grandchild.id)).await;

        // 3 folders + 2 files
        let removed = tree.delete(&alice, root.id).await.unwrap();
        assert_eq!(removed, 5);

        let folders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM folders")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(folders, 0);
        let files: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(files, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_folder_is_noop() {
        let (_db, tree, alice, _bob) = setup().await;

        assert_eq!(tree.delete(&alice, 999).await.unwrap(), 0);
        // Repeating the call stays a no-op
        assert_eq!(tree.delete(&alice, 999).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_db, tree, alice, _bob) = setup().await;

        let docs = tree.create(&alice, "Docs", None).await.unwrap();
        assert!(tree.delete(&alice, docs.id).await.unwrap() > 0);
        assert_eq!(tree.delete(&alice, docs.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_foreign_folder_delete_is_noop() {
        let (_db, tree, alice, bob) = setup().await;

        let docs = tree.create(&alice, "Docs", None).await.unwrap();
        assert_eq!(tree.delete(&bob, docs.id).await.unwrap(), 0);
        // Still there for the owner
        assert!(tree.list(&alice, Some(docs.id)).await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_path_root_to_target() {
        let (_db, tree, alice, _bob) = setup().await;

        let a = tree.create(&alice, "a", None).await.unwrap();
        let b = tree.create(&alice, "b", Some(a.id)).await.unwrap();
        let c = tree.create(&alice, "c", Some(b.id)).await.unwrap();

        let path = tree.resolve_path(&alice, c.id).await.unwrap();
        let names: Vec<_> = path.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_resolve_path_foreign_folder_fails() {
        let (_db, tree, alice, bob) = setup().await;

        let a = tree.create(&alice, "a", None).await.unwrap();
        let err = tree.resolve_path(&bob, a.id).await.unwrap_err();
        assert!(matches!(err, VaultError::NotFoundOrForbidden(_)));
    }
}
