//! ChatVault - Multi-Backend File Storage Gateway
//!
//! Stores files by proxying their bytes through chat platform bot accounts
//! (Telegram and Discord) while keeping all metadata in a local SQLite
//! catalog.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod storage;
pub mod web;

pub use auth::{SessionService, VerifiedIdentity};
pub use config::Config;
pub use db::{Database, DbPool, NewUser, User, UserRepository};
pub use error::{Result, VaultError};
pub use file::{BulkOperationCoordinator, FileCatalog, FolderTree, ShareLinkService};
pub use storage::{Platform, StorageBackend, StorageRouter};
pub use web::WebServer;
