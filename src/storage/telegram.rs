//! Telegram Bot API storage backend.
//!
//! Files are sent to the owner's chat with the bot via `sendPhoto`,
//! `sendVideo` or `sendDocument` depending on the MIME category. Downloads
//! resolve the blob id through `getFile` and fetch the file path from the
//! file endpoint; deletes call `deleteMessage`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{DeleteOutcome, MimeCategory, Platform, RemoteHandle, StorageBackend, UploadReceipt};
use crate::config::TelegramConfig;
use crate::{Result, VaultError};

/// Telegram [`StorageBackend`].
pub struct TelegramStore {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    max_upload_size: u64,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
    photo: Option<Vec<PhotoSize>>,
    video: Option<FileRef>,
    document: Option<FileRef>,
}

#[derive(Debug, Deserialize)]
struct PhotoSize {
    file_id: String,
    file_size: Option<u64>,
    width: i64,
    height: i64,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    file_id: String,
    file_size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct FilePath {
    file_path: Option<String>,
}

/// Whether a deleteMessage failure means the message is simply gone.
///
/// The Bot API reports both "never existed" and "too old to delete for
/// everyone" through the error description; either way the blob is not
/// coming back, so cleanup should proceed.
fn is_benign_delete_description(description: &str) -> bool {
    let d = description.to_lowercase();
    d.contains("message to delete not found") || d.contains("message can't be deleted")
}

impl TelegramStore {
    /// Create a store from configuration.
    pub fn from_config(config: &TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            max_upload_size: config.max_upload_size_mb * 1024 * 1024,
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.bot_token, file_path)
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        form: reqwest::multipart::Form,
    ) -> Result<ApiEnvelope<T>> {
        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| VaultError::Upstream(format!("telegram {method}: {e}")))?;

        response
            .json::<ApiEnvelope<T>>()
            .await
            .map_err(|e| VaultError::Upstream(format!("telegram {method} response: {e}")))
    }

    /// Pick the blob reference out of a send result.
    ///
    /// Photos come back as a list of variants; the largest one is the
    /// stored rendition.
    fn extract_blob(message: &Message, fallback_size: u64) -> Result<(String, u64)> {
        if let Some(photos) = &message.photo {
            let largest = photos
                .iter()
                .max_by_key(|p| p.width * p.height)
                .ok_or_else(|| VaultError::Upstream("empty photo list".to_string()))?;
            return Ok((
                largest.file_id.clone(),
                largest.file_size.unwrap_or(fallback_size),
            ));
        }
        if let Some(video) = &message.video {
            return Ok((video.file_id.clone(), video.file_size.unwrap_or(fallback_size)));
        }
        if let Some(document) = &message.document {
            return Ok((
                document.file_id.clone(),
                document.file_size.unwrap_or(fallback_size),
            ));
        }
        Err(VaultError::Upstream(
            "send result carried no file".to_string(),
        ))
    }
}

#[async_trait]
impl StorageBackend for TelegramStore {
    fn platform(&self) -> Platform {
        Platform::Telegram
    }

    fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    async fn upload(
        &self,
        owner_address: &str,
        data: &[u8],
        filename: &str,
        category: MimeCategory,
    ) -> Result<UploadReceipt> {
        let (method, field) = match category {
            MimeCategory::Photo => ("sendPhoto", "photo"),
            MimeCategory::Video => ("sendVideo", "video"),
            MimeCategory::Document => ("sendDocument", "document"),
        };

        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| VaultError::Upstream(format!("telegram part: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .text("chat_id", owner_address.to_string())
            .text("caption", filename.to_string())
            .part(field, part);

        let envelope: ApiEnvelope<Message> = self.call(method, form).await?;

        if !envelope.ok {
            return Err(VaultError::Upstream(format!(
                "telegram {method} failed: {}",
                envelope.description.unwrap_or_default()
            )));
        }
        let message = envelope
            .result
            .ok_or_else(|| VaultError::Upstream("telegram send returned no message".to_string()))?;

        let (blob_id, size) = Self::extract_blob(&message, data.len() as u64)?;
        debug!("telegram upload: message {} blob {}", message.message_id, blob_id);

        Ok(UploadReceipt {
            blob_id,
            message_id: message.message_id.to_string(),
            size,
        })
    }

    async fn download(&self, handle: &RemoteHandle) -> Result<Vec<u8>> {
        let form = reqwest::multipart::Form::new().text("file_id", handle.blob_id.clone());
        let envelope: ApiEnvelope<FilePath> = self.call("getFile", form).await?;

        if !envelope.ok {
            return Err(VaultError::Upstream(format!(
                "telegram getFile failed: {}",
                envelope.description.unwrap_or_default()
            )));
        }
        let file_path = envelope
            .result
            .and_then(|r| r.file_path)
            .ok_or_else(|| VaultError::Upstream("getFile returned no path".to_string()))?;

        let response = self
            .client
            .get(self.file_url(&file_path))
            .send()
            .await
            .map_err(|e| VaultError::Upstream(format!("telegram file fetch: {e}")))?;

        if !response.status().is_success() {
            return Err(VaultError::Upstream(format!(
                "telegram file fetch: HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VaultError::Upstream(format!("telegram file body: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, handle: &RemoteHandle) -> Result<DeleteOutcome> {
        let form = reqwest::multipart::Form::new()
            .text("chat_id", handle.owner_address.clone())
            .text("message_id", handle.message_id.clone());

        let envelope: ApiEnvelope<bool> = self.call("deleteMessage", form).await?;

        if envelope.ok {
            return Ok(DeleteOutcome::Deleted);
        }

        let description = envelope.description.unwrap_or_default();
        if is_benign_delete_description(&description) {
            return Ok(DeleteOutcome::AlreadyAbsent);
        }

        Err(VaultError::Upstream(format!(
            "telegram deleteMessage failed: {description}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_delete_descriptions() {
        assert!(is_benign_delete_description(
            "Bad Request: message to delete not found"
        ));
        assert!(is_benign_delete_description(
            "Bad Request: message can't be deleted for everyone"
        ));
        assert!(!is_benign_delete_description("Unauthorized"));
        assert!(!is_benign_delete_description("Too Many Requests"));
    }

    #[test]
    fn test_extract_blob_prefers_largest_photo() {
        let message = Message {
            message_id: 1,
            photo: Some(vec![
                PhotoSize {
                    file_id: "small".to_string(),
                    file_size: Some(100),
                    width: 90,
                    height: 90,
                },
                PhotoSize {
                    file_id: "large".to_string(),
                    file_size: Some(9000),
                    width: 1280,
                    height: 960,
                },
                PhotoSize {
                    file_id: "medium".to_string(),
                    file_size: Some(800),
                    width: 320,
                    height: 240,
                },
            ]),
            video: None,
            document: None,
        };

        let (blob_id, size) = TelegramStore::extract_blob(&message, 0).unwrap();
        assert_eq!(blob_id, "large");
        assert_eq!(size, 9000);
    }

    #[test]
    fn test_extract_blob_document_falls_back_to_upload_size() {
        let message = Message {
            message_id: 2,
            photo: None,
            video: None,
            document: Some(FileRef {
                file_id: "doc".to_string(),
                file_size: None,
            }),
        };

        let (blob_id, size) = TelegramStore::extract_blob(&message, 1234).unwrap();
        assert_eq!(blob_id, "doc");
        assert_eq!(size, 1234);
    }

    #[test]
    fn test_extract_blob_empty_message_is_upstream() {
        let message = Message {
            message_id: 3,
            photo: None,
            video: None,
            document: None,
        };

        let err = TelegramStore::extract_blob(&message, 0).unwrap_err();
        assert!(matches!(err, VaultError::Upstream(_)));
    }

    #[test]
    fn test_urls() {
        let store = TelegramStore::from_config(&TelegramConfig {
            enabled: true,
            bot_token: "123:abc".to_string(),
            api_base: "https://api.telegram.org/".to_string(),
            max_upload_size_mb: 50,
        });

        assert_eq!(
            store.method_url("sendDocument"),
            "https://api.telegram.org/bot123:abc/sendDocument"
        );
        assert_eq!(
            store.file_url("documents/file_7.txt"),
            "https://api.telegram.org/file/bot123:abc/documents/file_7.txt"
        );
        assert_eq!(store.max_upload_size(), 50 * 1024 * 1024);
    }
}
