//! Configuration module for ChatVault.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, VaultError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/chatvault.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Telegram backend configuration.
///
/// Uploads are sent to the owner's own chat with the bot; the bot token
/// comes from `@BotFather`.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Whether the Telegram backend is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Bot token (can also be set via CHATVAULT_TELEGRAM_BOT_TOKEN).
    #[serde(default)]
    pub bot_token: String,
    /// Bot API base URL.
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_telegram_max_upload")]
    pub max_upload_size_mb: u64,
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_telegram_max_upload() -> u64 {
    50
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token: String::new(),
            api_base: default_telegram_api_base(),
            max_upload_size_mb: default_telegram_max_upload(),
        }
    }
}

/// Discord backend configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    /// Whether the Discord backend is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Bot token (can also be set via CHATVAULT_DISCORD_BOT_TOKEN).
    #[serde(default)]
    pub bot_token: String,
    /// REST API base URL.
    #[serde(default = "default_discord_api_base")]
    pub api_base: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_discord_max_upload")]
    pub max_upload_size_mb: u64,
}

fn default_discord_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_discord_max_upload() -> u64 {
    25
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bot_token: String::new(),
            api_base: default_discord_api_base(),
            max_upload_size_mb: default_discord_max_upload(),
        }
    }
}

/// Session configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in minutes.
    #[serde(default = "default_session_minutes")]
    pub duration_minutes: i64,
    /// Interval between expired-credential sweeps, in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_session_minutes() -> i64 {
    24 * 60
}

fn default_cleanup_interval() -> u64 {
    3600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_session_minutes(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

/// Share link configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareConfig {
    /// Link lifetime in minutes.
    #[serde(default = "default_share_minutes")]
    pub ttl_minutes: i64,
    /// Public base URL used when building share URLs
    /// (e.g., "https://vault.example.com").
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_share_minutes() -> i64 {
    30
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: default_share_minutes(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path. When unset, logs go to the console only.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Telegram backend configuration.
    #[serde(default)]
    pub telegram: TelegramConfig,
    /// Discord backend configuration.
    #[serde(default)]
    pub discord: DiscordConfig,
    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Share link configuration.
    #[serde(default)]
    pub share: ShareConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(VaultError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| VaultError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `CHATVAULT_TELEGRAM_BOT_TOKEN`: Override the Telegram bot token
    /// - `CHATVAULT_DISCORD_BOT_TOKEN`: Override the Discord bot token
    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("CHATVAULT_TELEGRAM_BOT_TOKEN") {
            if !token.is_empty() {
                self.telegram.bot_token = token;
            }
        }
        if let Ok(token) = std::env::var("CHATVAULT_DISCORD_BOT_TOKEN") {
            if !token.is_empty() {
                self.discord.bot_token = token;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - No storage backend is enabled
    /// - An enabled backend is missing its bot token
    pub fn validate(&self) -> Result<()> {
        if !self.telegram.enabled && !self.discord.enabled {
            return Err(VaultError::Config(
                "no storage backend enabled; enable [telegram] or [discord]".to_string(),
            ));
        }
        if self.telegram.enabled && self.telegram.bot_token.is_empty() {
            return Err(VaultError::Config(
                "Telegram backend is enabled but bot_token is not set. \
                 Set it in config.toml or via CHATVAULT_TELEGRAM_BOT_TOKEN."
                    .to_string(),
            ));
        }
        if self.discord.enabled && self.discord.bot_token.is_empty() {
            return Err(VaultError::Config(
                "Discord backend is enabled but bot_token is not set. \
                 Set it in config.toml or via CHATVAULT_DISCORD_BOT_TOKEN."
                    .to_string(),
            ));
        }
        Ok(())
    }
}
