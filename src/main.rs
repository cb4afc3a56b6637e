use std::sync::Arc;

use tracing::info;

use chatvault::config::LoggingConfig;
use chatvault::storage::{DiscordStore, TelegramStore};
use chatvault::{Config, Database, StorageRouter, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging; an unopenable log file degrades to console only
    if let Err(e) = chatvault::logging::init(&config.logging) {
        eprintln!("Failed to open log file, logging to console only: {e}");
        let console_only = LoggingConfig {
            file: None,
            ..config.logging.clone()
        };
        if chatvault::logging::init(&console_only).is_err() {
            eprintln!("Logging is disabled");
        }
    }

    info!("ChatVault - Multi-Backend File Storage Gateway");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Failed to open database {}: {e}", config.database.path);
            std::process::exit(1);
        }
    };

    let mut router = StorageRouter::new();
    if config.telegram.enabled {
        router.register(Arc::new(TelegramStore::from_config(&config.telegram)));
        info!("Telegram backend enabled");
    }
    if config.discord.enabled {
        router.register(Arc::new(DiscordStore::from_config(&config.discord)));
        info!("Discord backend enabled");
    }

    let server = match WebServer::new(&config, &db, router) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to configure server: {e}");
            std::process::exit(1);
        }
    };

    info!("Server configured on {}", server.addr());
    if let Err(e) = server.run().await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}
