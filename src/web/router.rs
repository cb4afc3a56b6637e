//! Router configuration for the Web API.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_folder, create_share, delete_files, delete_folder, download_file, download_zip,
    file_activity, folder_path, get_folder, list_root, login, logout, rename_file, rename_folder,
    resolve_share, upload_file, AppState,
};
use super::middleware::create_cors_layer;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    max_body_bytes: usize,
) -> Router {
    let api_routes = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/files/upload", post(upload_file))
        .route("/files/download/zip", post(download_zip))
        .route("/files/download/:file_id", get(download_file))
        .route("/files/delete/:file_id", delete(delete_files))
        .route("/files/rename/:file_id", put(rename_file))
        // One path serves both directions: POST mints a link for a file id,
        // GET resolves a minted token without a session
        .route("/files/share/:token", post(create_share).get(resolve_share))
        .route("/files/:file_id/activity", get(file_activity))
        .route("/folders", post(create_folder).get(list_root))
        .route(
            "/folders/:folder_id",
            get(get_folder).put(rename_folder).delete(delete_folder),
        )
        .route("/folders/path/:folder_id", get(folder_path));

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
