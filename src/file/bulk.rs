//! Bulk operations: batched deletes and zip downloads.

use std::io::Write;

use futures::future::join_all;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::db::User;
use crate::{Result, VaultError};

use super::catalog::FileCatalog;

/// Coordinates operations that span several files at once.
#[derive(Clone)]
pub struct BulkOperationCoordinator {
    catalog: FileCatalog,
}

impl BulkOperationCoordinator {
    /// Create a new coordinator.
    pub fn new(catalog: FileCatalog) -> Self {
        Self { catalog }
    }

    /// Delete a batch of files. See [`FileCatalog::delete_many`] for the
    /// per-id abort policy.
    pub async fn delete_many(&self, owner: &User, file_ids: &[i64]) -> Result<u64> {
        self.catalog.delete_many(owner, file_ids).await
    }

    /// Package a set of owned files into one deflate zip archive.
    ///
    /// All-or-nothing: if any metadata lookup or content fetch fails, the
    /// whole operation fails naming the offending file, and no partial
    /// archive is produced.
    pub async fn download_zip(&self, owner: &User, file_ids: &[i64]) -> Result<Vec<u8>> {
        if file_ids.is_empty() {
            return Err(VaultError::InvalidInput("no file ids given".to_string()));
        }

        let mut entries = Vec::with_capacity(file_ids.len());
        for &file_id in file_ids {
            let metadata = self
                .catalog
                .get_owned(owner, file_id)
                .await
                .map_err(|_| VaultError::PartialFetch(format!("file {file_id}")))?;
            entries.push(metadata);
        }

        // Fetch everything concurrently; one miss sinks the batch.
        let fetches = entries
            .iter()
            .map(|metadata| self.catalog.fetch_content(owner, metadata));
        let results = join_all(fetches).await;

        let mut contents = Vec::with_capacity(entries.len());
        for (metadata, result) in entries.iter().zip(results) {
            let bytes =
                result.map_err(|_| VaultError::PartialFetch(format!("file {}", metadata.id)))?;
            contents.push(bytes);
        }

        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut cursor);
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

            for (metadata, bytes) in entries.iter().zip(&contents) {
                writer
                    .start_file(&metadata.name, options)
                    .map_err(zip_error)?;
                writer.write_all(bytes)?;
            }
            writer.finish().map_err(zip_error)?;
        }

        Ok(cursor.into_inner())
    }
}

fn zip_error(e: zip::result::ZipError) -> VaultError {
    VaultError::Io(std::io::Error::new(std::io::ErrorKind::Other, e))
}
