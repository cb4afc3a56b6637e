//! Discord REST storage backend.
//!
//! Files ride along as message attachments in the owner's DM channel with
//! the bot. The DM channel is resolved on every call (`POST
//! /users/@me/channels` returns the existing channel for a known
//! recipient), so only the owner's user id and the message id need to be
//! persisted.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{DeleteOutcome, MimeCategory, Platform, RemoteHandle, StorageBackend, UploadReceipt};
use crate::config::DiscordConfig;
use crate::{Result, VaultError};

/// JSON error code for "Unknown Message".
const UNKNOWN_MESSAGE: i64 = 10008;

/// Discord [`StorageBackend`].
pub struct DiscordStore {
    client: reqwest::Client,
    api_base: String,
    bot_token: String,
    max_upload_size: u64,
}

#[derive(Debug, Deserialize)]
struct Channel {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DiscordMessage {
    id: String,
    attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
struct Attachment {
    id: String,
    url: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<i64>,
    message: Option<String>,
}

impl DiscordStore {
    /// Create a store from configuration.
    pub fn from_config(config: &DiscordConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            max_upload_size: config.max_upload_size_mb * 1024 * 1024,
        }
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    /// Resolve the DM channel for a recipient.
    async fn dm_channel(&self, owner_address: &str) -> Result<Channel> {
        let response = self
            .client
            .post(format!("{}/users/@me/channels", self.api_base))
            .header("Authorization", self.auth_header())
            .json(&json!({ "recipient_id": owner_address }))
            .send()
            .await
            .map_err(|e| VaultError::Upstream(format!("discord dm channel: {e}")))?;

        if !response.status().is_success() {
            return Err(VaultError::Upstream(format!(
                "discord dm channel: HTTP {}",
                response.status()
            )));
        }

        response
            .json::<Channel>()
            .await
            .map_err(|e| VaultError::Upstream(format!("discord dm channel body: {e}")))
    }
}

#[async_trait]
impl StorageBackend for DiscordStore {
    fn platform(&self) -> Platform {
        Platform::Discord
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
        let channel = self.dm_channel(owner_address).await?;

        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| VaultError::Upstream(format!("discord part: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .text("content", filename.to_string())
            .part("files[0]", part);

        let response = self
            .client
            .post(format!("{}/channels/{}/messages", self.api_base, channel.id))
            .header("Authorization", self.auth_header())
            .multipart(form)
            .send()
            .await
            .map_err(|e| VaultError::Upstream(format!("discord send: {e}")))?;

        if !response.status().is_success() {
            return Err(VaultError::Upstream(format!(
                "discord send: HTTP {}",
                response.status()
            )));
        }

        let message = response
            .json::<DiscordMessage>()
            .await
            .map_err(|e| VaultError::Upstream(format!("discord send body: {e}")))?;

        let attachment = message
            .attachments
            .first()
            .ok_or_else(|| VaultError::Upstream("message carried no attachment".to_string()))?;

        debug!(
            "discord upload: message {} attachment {}",
            message.id, attachment.id
        );

        Ok(UploadReceipt {
            blob_id: attachment.id.clone(),
            message_id: message.id.clone(),
            size: attachment.size,
        })
    }

    async fn download(&self, handle: &RemoteHandle) -> Result<Vec<u8>> {
        let channel = self.dm_channel(&handle.owner_address).await?;

        // Attachment CDN URLs are short-lived; re-read the message for a
        // fresh one.
        let response = self
            .client
            .get(format!(
                "{}/channels/{}/messages/{}",
                self.api_base, channel.id, handle.message_id
            ))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| VaultError::Upstream(format!("discord message fetch: {e}")))?;

        if !response.status().is_success() {
            return Err(VaultError::Upstream(format!(
                "discord message fetch: HTTP {}",
                response.status()
            )));
        }

        let message = response
            .json::<DiscordMessage>()
            .await
            .map_err(|e| VaultError::Upstream(format!("discord message body: {e}")))?;

        let attachment = message
            .attachments
            .iter()
            .find(|a| a.id == handle.blob_id)
            .or_else(|| message.attachments.first())
            .ok_or_else(|| VaultError::Upstream("message has no attachments".to_string()))?;

        let file = self
            .client
            .get(&attachment.url)
            .send()
            .await
            .map_err(|e| VaultError::Upstream(format!("discord attachment fetch: {e}")))?;

        if !file.status().is_success() {
            return Err(VaultError::Upstream(format!(
                "discord attachment fetch: HTTP {}",
                file.status()
            )));
        }

        let bytes = file
            .bytes()
            .await
            .map_err(|e| VaultError::Upstream(format!("discord attachment body: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, handle: &RemoteHandle) -> Result<DeleteOutcome> {
        let channel = self.dm_channel(&handle.owner_address).await?;

        let response = self
            .client
            .delete(format!(
                "{}/channels/{}/messages/{}",
                self.api_base, channel.id, handle.message_id
            ))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| VaultError::Upstream(format!("discord delete: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(DeleteOutcome::Deleted);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            let body = response.json::<ApiError>().await.unwrap_or(ApiError {
                code: None,
                message: None,
            });
            if classify_not_found(body.code) {
                return Ok(DeleteOutcome::AlreadyAbsent);
            }
            return Err(VaultError::Upstream(format!(
                "discord delete: {}",
                body.message.unwrap_or_else(|| status.to_string())
            )));
        }

        Err(VaultError::Upstream(format!(
            "discord delete: HTTP {status}"
        )))
    }
}

/// A 404 with no error code or the Unknown Message code means the message
/// is already gone.
fn classify_not_found(code: Option<i64>) -> bool {
    match code {
        None => true,
        Some(code) => code == UNKNOWN_MESSAGE,
    }
}
