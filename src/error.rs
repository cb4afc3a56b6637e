//! Error types for ChatVault.

use thiserror::Error;

/// Common error type for ChatVault.
#[derive(Error, Debug)]
pub enum VaultError {
    /// Database error.
    ///
    /// This is a generic database error that wraps errors from the metadata
    /// store. Errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing or invalid session token.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Session exists but its expiry has passed.
    #[error("session expired")]
    SessionExpired,

    /// Entity absent or owned by another user.
    ///
    /// The two cases share one variant so a caller cannot tell whether
    /// another user's file or folder exists.
    #[error("{0} not found")]
    NotFoundOrForbidden(String),

    /// Missing or malformed request input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Upload exceeds the target platform's size limit.
    #[error("payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge { size: u64, limit: u64 },

    /// Remote platform call failed for a reason other than "already absent".
    #[error("upstream error: {0}")]
    Upstream(String),

    /// No share link matches the token, or its file no longer exists.
    #[error("share link not found")]
    LinkNotFound,

    /// The share link's expiry has passed.
    #[error("share link expired")]
    LinkExpired,

    /// A bulk download could not retrieve every requested file.
    #[error("partial fetch failure: {0}")]
    PartialFetch(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for VaultError {
    fn from(e: sqlx::Error) -> Self {
        VaultError::Database(e.to_string())
    }
}

/// Result type alias for ChatVault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
