//! File domain: metadata, folders, activity, and the services above them.

pub mod activity;
pub mod bulk;
pub mod catalog;
pub mod folder;
pub mod metadata;
pub mod share;
pub mod tree;

pub use activity::{ActivityEntry, ActivityKind, ActivityRepository};
pub use bulk::BulkOperationCoordinator;
pub use catalog::{DownloadResult, FileCatalog, UploadRequest};
pub use folder::{Folder, FolderRepository, NewFolder};
pub use metadata::{FileMetadata, FileRepository, NewFile};
pub use share::{ShareLink, ShareLinkService, SharedFile};
pub use tree::{FolderListing, FolderTree};
