//! In-memory storage backend.
//!
//! Stands in for a chat platform in tests and local development. Failure
//! injection knobs make the hard-to-reach upstream error paths testable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use super::{DeleteOutcome, MimeCategory, Platform, RemoteHandle, StorageBackend, UploadReceipt};
use crate::{Result, VaultError};

const DEFAULT_MAX_UPLOAD: u64 = 50 * 1024 * 1024;

/// In-memory [`StorageBackend`].
pub struct MemoryStore {
    platform: Platform,
    max_upload_size: u64,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    next_id: AtomicU64,
    fail_uploads: AtomicBool,
    fail_downloads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryStore {
    /// Create a store posing as the given platform.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            max_upload_size: DEFAULT_MAX_UPLOAD,
            blobs: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            fail_uploads: AtomicBool::new(false),
            fail_downloads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Create a store with a custom size limit.
    pub fn with_max_upload_size(platform: Platform, max_upload_size: u64) -> Self {
        Self {
            max_upload_size,
            ..Self::new(platform)
        }
    }

    /// Make subsequent uploads fail with an upstream error.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent downloads fail with an upstream error.
    pub fn set_fail_downloads(&self, fail: bool) {
        self.fail_downloads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent deletes fail with an upstream error.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Number of blobs currently held.
    pub fn blob_count(&self) -> usize {
        self.blobs.lock().map(|m| m.len()).unwrap_or(0)
    }

    fn lock_blobs(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.blobs
            .lock()
            .map_err(|_| VaultError::Upstream("memory store poisoned".to_string()))
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    async fn upload(
        &self,
        owner_address: &str,
        data: &[u8],
        filename: &str,
        _category: MimeCategory,
    ) -> Result<UploadReceipt> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(VaultError::Upstream("injected upload failure".to_string()));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        let blob_id = format!("mem-blob-{n}");
        let message_id = format!("mem-msg-{n}");

        debug!(
            "memory store: {} bytes as {} for {} ({})",
            data.len(),
            blob_id,
            owner_address,
            filename
        );

        self.lock_blobs()?.insert(blob_id.clone(), data.to_vec());

        Ok(UploadReceipt {
            blob_id,
            message_id,
            size: data.len() as u64,
        })
    }

    async fn download(&self, handle: &RemoteHandle) -> Result<Vec<u8>> {
        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(VaultError::Upstream(
                "injected download failure".to_string(),
            ));
        }

        self.lock_blobs()?
            .get(&handle.blob_id)
            .cloned()
            .ok_or_else(|| VaultError::Upstream(format!("no such blob: {}", handle.blob_id)))
    }

    async fn delete(&self, handle: &RemoteHandle) -> Result<DeleteOutcome> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(VaultError::Upstream("injected delete failure".to_string()));
        }

        match self.lock_blobs()?.remove(&handle.blob_id) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::AlreadyAbsent),
        }
    }
}
