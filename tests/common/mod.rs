//! Shared fixtures for Web API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};

use chatvault::storage::MemoryStore;
use chatvault::web::{create_health_router, create_router, AppState};
use chatvault::{Config, Database, Platform, StorageRouter};

/// Upload limit of the in-memory test backends, in bytes.
pub const TEST_UPLOAD_LIMIT: u64 = 4096;

/// A running test API with its backing database and stores.
pub struct TestApp {
    /// Keeps the in-memory database alive for the test's duration.
    pub db: Database,
    /// HTTP test server.
    pub server: TestServer,
    /// The Telegram-flavored in-memory store.
    pub telegram: Arc<MemoryStore>,
    /// The Discord-flavored in-memory store.
    pub discord: Arc<MemoryStore>,
}

/// Spin up the API over an in-memory database and in-memory backends.
pub async fn spawn_app() -> TestApp {
    let db = Database::open_in_memory().await.unwrap();

    let telegram = Arc::new(MemoryStore::with_max_upload_size(
        Platform::Telegram,
        TEST_UPLOAD_LIMIT,
    ));
    let discord = Arc::new(MemoryStore::with_max_upload_size(
        Platform::Discord,
        TEST_UPLOAD_LIMIT,
    ));

    let mut router = StorageRouter::new();
    router.register(telegram.clone());
    router.register(discord.clone());

    let mut config = Config::default();
    config.share.public_base_url = "http://testserver".to_string();

    let app_state = Arc::new(AppState::new(&db, router, &config));
    let app = create_router(app_state, &[], 8 * 1024 * 1024).merge(create_health_router());

    TestApp {
        db,
        server: TestServer::new(app).unwrap(),
        telegram,
        discord,
    }
}

/// Log a verified identity in and return the session token.
pub async fn login(server: &TestServer, platform: &str, external_id: &str, username: &str) -> String {
    let response = server
        .post("/api/auth/login")
        .json(&json!({
            "platform": platform,
            "external_id": external_id,
            "username": username,
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["data"]["token"].as_str().unwrap().to_string()
}

/// Upload a file through the API and return its id.
pub async fn upload(server: &TestServer, token: &str, name: &str, content: &[u8]) -> i64 {
    upload_into(server, token, name, content, None).await
}

/// Upload a file into a folder through the API and return its id.
pub async fn upload_into(
    server: &TestServer,
    token: &str,
    name: &str,
    content: &[u8],
    folder_id: Option<i64>,
) -> i64 {
    let part = Part::bytes(content.to_vec())
        .file_name(name.to_string())
        .mime_type("application/octet-stream");
    let mut form = MultipartForm::new().add_part("file", part);
    if let Some(folder_id) = folder_id {
        form = form.add_text("folder_id", folder_id.to_string());
    }

    let response = server
        .post("/api/files/upload")
        .authorization_bearer(token)
        .multipart(form)
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["data"]["id"].as_i64().unwrap()
}

/// Back-date a session so it reads as expired.
pub async fn expire_session(db: &Database, token: &str) {
    sqlx::query("UPDATE sessions SET expires_at = '2000-01-01 00:00:00' WHERE token = $1")
        .bind(token)
        .execute(db.pool())
        .await
        .unwrap();
}

/// Back-date a share link so it reads as expired.
pub async fn expire_share_link(db: &Database, token: &str) {
    sqlx::query("UPDATE share_links SET expires_at = '2000-01-01 00:00:00' WHERE token = $1")
        .bind(token)
        .execute(db.pool())
        .await
        .unwrap();
}
