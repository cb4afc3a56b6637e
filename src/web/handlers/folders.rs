//! Folder handlers for the Web API.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::web::dto::{
    ApiResponse, CreateFolderRequest, DeleteResponse, FolderListingResponse, FolderResponse,
    RenameFolderRequest,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// POST /api/folders - Create a folder.
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<CreateFolderRequest>,
) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
    let folder = state.tree.create(&user, &req.name, req.parent_id).await?;
    Ok(Json(ApiResponse::new(FolderResponse::from(folder))))
}

/// GET /api/folders - List the root level of the hierarchy.
pub async fn list_root(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<FolderListingResponse>>, ApiError> {
    let listing = state.tree.list(&user, None).await?;
    Ok(Json(ApiResponse::new(FolderListingResponse::from(listing))))
}

/// GET /api/folders/:folder_id - List one folder level.
pub async fn get_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<FolderListingResponse>>, ApiError> {
    let listing = state.tree.list(&user, Some(folder_id)).await?;
    Ok(Json(ApiResponse::new(FolderListingResponse::from(listing))))
}

/// PUT /api/folders/:folder_id - Rename a folder.
pub async fn rename_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(folder_id): Path<i64>,
    Json(req): Json<RenameFolderRequest>,
) -> Result<Json<ApiResponse<FolderResponse>>, ApiError> {
    let folder = state.tree.rename(&user, folder_id, &req.new_name).await?;
    Ok(Json(ApiResponse::new(FolderResponse::from(folder))))
}

/// DELETE /api/folders/:folder_id - Delete a folder and everything under it.
///
/// Deleting a missing folder succeeds with a zero count.
pub async fn delete_folder(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<DeleteResponse>>, ApiError> {
    let deleted = state.tree.delete(&user, folder_id).await?;
    Ok(Json(ApiResponse::new(DeleteResponse { deleted })))
}

/// GET /api/folders/path/:folder_id - Chain of folders from the root to a
/// target, inclusive.
pub async fn folder_path(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(folder_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<FolderResponse>>>, ApiError> {
    let path = state.tree.resolve_path(&user, folder_id).await?;
    let responses = path.into_iter().map(FolderResponse::from).collect();

    Ok(Json(ApiResponse::new(responses)))
}
