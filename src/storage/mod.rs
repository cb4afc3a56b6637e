//! Storage backends for ChatVault.
//!
//! File bytes live inside chat platforms, uploaded through bot accounts.
//! Each platform is wrapped in a [`StorageBackend`] implementation; the
//! rest of the system only sees the trait and never platform wire details.

mod discord;
mod memory;
mod telegram;

pub use discord::DiscordStore;
pub use memory::MemoryStore;
pub use telegram::TelegramStore;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, VaultError};

/// Supported chat platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Telegram Bot API.
    Telegram,
    /// Discord REST API.
    Discord,
}

impl Platform {
    /// Convert platform to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Telegram => "telegram",
            Platform::Discord => "discord",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "telegram" => Ok(Platform::Telegram),
            "discord" => Ok(Platform::Discord),
            _ => Err(format!("unknown platform: {s}")),
        }
    }
}

// For #[sqlx(try_from = "String")] row mapping
impl TryFrom<String> for Platform {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

/// Coarse content classification derived from the upload MIME type.
///
/// Telegram picks its send method from this; other backends ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeCategory {
    /// `image/*` uploads.
    Photo,
    /// `video/*` uploads.
    Video,
    /// Everything else.
    Document,
}

impl MimeCategory {
    /// Classify a MIME type string.
    pub fn classify(mime: &str) -> Self {
        if mime.starts_with("image/") {
            MimeCategory::Photo
        } else if mime.starts_with("video/") {
            MimeCategory::Video
        } else {
            MimeCategory::Document
        }
    }

    /// Convert category to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeCategory::Photo => "photo",
            MimeCategory::Video => "video",
            MimeCategory::Document => "document",
        }
    }
}

impl FromStr for MimeCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "photo" => Ok(MimeCategory::Photo),
            "video" => Ok(MimeCategory::Video),
            "document" => Ok(MimeCategory::Document),
            _ => Err(format!("unknown category: {s}")),
        }
    }
}

// For #[sqlx(try_from = "String")] row mapping
impl TryFrom<String> for MimeCategory {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

/// Receipt returned by a successful upload.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    /// Platform-side blob identifier.
    pub blob_id: String,
    /// Platform-side message identifier carrying the blob.
    pub message_id: String,
    /// Size as reported by the platform, in bytes.
    pub size: u64,
}

/// Everything a backend needs to locate a stored blob again.
#[derive(Debug, Clone)]
pub struct RemoteHandle {
    /// Owner's remote address (chat or user id on the platform).
    pub owner_address: String,
    /// Platform-side blob identifier.
    pub blob_id: String,
    /// Platform-side message identifier.
    pub message_id: String,
}

/// Outcome of a remote delete.
///
/// "Already absent" is a benign outcome, not an error; hard failures come
/// back as `Err(Upstream)`. Classification happens inside the adapter, so
/// no caller ever matches on platform error strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The message was removed.
    Deleted,
    /// The message was already gone (or the platform refused a redundant
    /// delete).
    AlreadyAbsent,
}

/// A chat platform acting as blob storage.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Platform this backend serves.
    fn platform(&self) -> Platform;

    /// Maximum accepted payload size in bytes.
    fn max_upload_size(&self) -> u64;

    /// Upload a blob on behalf of an owner. Returns platform identifiers
    /// needed to fetch or delete it later.
    async fn upload(
        &self,
        owner_address: &str,
        data: &[u8],
        filename: &str,
        category: MimeCategory,
    ) -> Result<UploadReceipt>;

    /// Fetch the full byte content of a stored blob.
    async fn download(&self, handle: &RemoteHandle) -> Result<Vec<u8>>;

    /// Delete the message carrying a blob.
    async fn delete(&self, handle: &RemoteHandle) -> Result<DeleteOutcome>;
}

/// Maps platforms to registered backends.
#[derive(Clone, Default)]
pub struct StorageRouter {
    backends: HashMap<Platform, Arc<dyn StorageBackend>>,
}

impl StorageRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend; replaces any previous backend for the platform.
    pub fn register(&mut self, backend: Arc<dyn StorageBackend>) {
        self.backends.insert(backend.platform(), backend);
    }

    /// Look up the backend for a platform.
    pub fn get(&self, platform: Platform) -> Result<Arc<dyn StorageBackend>> {
        self.backends.get(&platform).cloned().ok_or_else(|| {
            VaultError::InvalidInput(format!("no backend registered for platform {platform}"))
        })
    }

    /// Platforms with a registered backend.
    pub fn platforms(&self) -> Vec<Platform> {
        self.backends.keys().copied().collect()
    }
}

impl fmt::Debug for StorageRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageRouter")
            .field("platforms", &self.platforms())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_as_str_roundtrip() {
        for platform in [Platform::Telegram, Platform::Discord] {
            assert_eq!(Platform::from_str(platform.as_str()).unwrap(), platform);
        }
    }

    #[test]
    fn test_platform_from_str_case_insensitive() {
        assert_eq!(Platform::from_str("Telegram").unwrap(), Platform::Telegram);
        assert_eq!(Platform::from_str("DISCORD").unwrap(), Platform::Discord);
        assert!(Platform::from_str("slack").is_err());
    }

    #[test]
    fn test_mime_classify() {
        assert_eq!(MimeCategory::classify("image/png"), MimeCategory::Photo);
        assert_eq!(MimeCategory::classify("image/jpeg"), MimeCategory::Photo);
        assert_eq!(MimeCategory::classify("video/mp4"), MimeCategory::Video);
        assert_eq!(
            MimeCategory::classify("application/pdf"),
            MimeCategory::Document
        );
        assert_eq!(MimeCategory::classify("text/plain"), MimeCategory::Document);
        assert_eq!(MimeCategory::classify(""), MimeCategory::Document);
    }

    #[test]
    fn test_mime_category_roundtrip() {
        for category in [
            MimeCategory::Photo,
            MimeCategory::Video,
            MimeCategory::Document,
        ] {
            assert_eq!(
                MimeCategory::from_str(category.as_str()).unwrap(),
                category
            );
        }
    }

    #[tokio::test]
    async fn test_router_missing_platform_is_invalid_input() {
        let router = StorageRouter::new();
        let err = router.get(Platform::Telegram).err().unwrap();
        assert!(matches!(err, VaultError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_router_register_and_get() {
        let mut router = StorageRouter::new();
        router.register(Arc::new(MemoryStore::new(Platform::Telegram)));

        assert!(router.get(Platform::Telegram).is_ok());
        assert!(router.get(Platform::Discord).is_err());
        assert_eq!(router.platforms(), vec![Platform::Telegram]);
    }
}
