//! API handlers for the Web API.

pub mod auth;
pub mod files;
pub mod folders;
pub mod share;

pub use auth::*;
pub use files::*;
pub use folders::*;
pub use share::*;

use crate::auth::SessionService;
use crate::config::Config;
use crate::file::{BulkOperationCoordinator, FileCatalog, FolderTree, ShareLinkService};
use crate::storage::StorageRouter;
use crate::Database;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Session manager.
    pub sessions: SessionService,
    /// File operations.
    pub catalog: FileCatalog,
    /// Folder hierarchy operations.
    pub tree: FolderTree,
    /// Share link minting and resolution.
    pub shares: ShareLinkService,
    /// Bulk operations.
    pub bulk: BulkOperationCoordinator,
}

impl AppState {
    /// Create a new application state.
    pub fn new(db: &Database, router: StorageRouter, config: &Config) -> Self {
        let pool = db.pool().clone();
        let catalog = FileCatalog::new(pool.clone(), router);

        Self {
            sessions: SessionService::new(pool.clone(), config.session.duration_minutes),
            tree: FolderTree::new(pool.clone()),
            shares: ShareLinkService::new(
                pool,
                catalog.clone(),
                config.share.ttl_minutes,
                &config.share.public_base_url,
            ),
            bulk: BulkOperationCoordinator::new(catalog.clone()),
            catalog,
        }
    }
}
