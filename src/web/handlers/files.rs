//! File handlers for the Web API.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::header,
    response::Response,
    Json,
};

use crate::file::UploadRequest;
use crate::storage::Platform;
use crate::web::dto::{
    ActivityResponse, ApiResponse, DeleteResponse, FileIdsRequest, FileResponse, RenameRequest,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Generate a safe Content-Disposition header value for file downloads.
///
/// Sanitizes the filename to prevent header injection and uses RFC 5987
/// encoding for non-ASCII filenames.
pub(crate) fn content_disposition_header(filename: &str) -> String {
    // ASCII fallback with control characters, quotes and backslashes removed
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' => '_',
            '\\' => '_',
            _ => c,
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    // RFC 5987 filename* parameter with UTF-8 encoding
    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// Build an attachment response for downloaded bytes.
pub(crate) fn attachment_response(filename: &str, content: Vec<u8>) -> Result<Response, ApiError> {
    let content_type = mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string();

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(filename),
        )
        .body(Body::from(content))
        .map_err(|e| {
            tracing::error!("Failed to build download response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// POST /api/files/upload - Upload a file from a multipart form.
///
/// Expected fields: `file` (required), `platform` and `folder_id`
/// (optional).
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut platform: Option<Platform> = None;
    let mut folder_id: Option<i64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(|n| n.to_string())
                    .ok_or_else(|| ApiError::bad_request("File field has no filename"))?;
                let content_type = field.content_type().map(|ct| ct.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
                file = Some((filename, content_type, bytes.to_vec()));
            }
            "platform" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read field: {e}")))?;
                platform = Some(
                    Platform::from_str(&text)
                        .map_err(|_| ApiError::bad_request(format!("Unknown platform: {text}")))?,
                );
            }
            "folder_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read field: {e}")))?;
                folder_id = Some(
                    text.parse()
                        .map_err(|_| ApiError::bad_request(format!("Invalid folder id: {text}")))?,
                );
            }
            _ => {}
        }
    }

    let (filename, mime_type, content) =
        file.ok_or_else(|| ApiError::bad_request("Missing file field"))?;

    let metadata = state
        .catalog
        .upload(
            &user,
            UploadRequest {
                filename,
                content,
                mime_type,
                platform,
                folder_id,
            },
        )
        .await?;

    Ok(Json(ApiResponse::new(FileResponse::from(metadata))))
}

/// GET /api/files/download/:file_id - Download a file's content.
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Response, ApiError> {
    let result = state.catalog.download(&user, file_id).await?;
    attachment_response(&result.metadata.name, result.content)
}

/// POST /api/files/download/zip - Download a batch of files as one archive.
pub async fn download_zip(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(req): Json<FileIdsRequest>,
) -> Result<Response, ApiError> {
    let archive = state.bulk.download_zip(&user, &req.file_ids).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, "application/zip")
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header("files.zip"),
        )
        .body(Body::from(archive))
        .map_err(|e| {
            tracing::error!("Failed to build zip response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// DELETE /api/files/delete/:file_id - Delete one file, or a batch when a
/// `file_ids` body is present.
pub async fn delete_files(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(file_id): Path<i64>,
    body: Option<Json<FileIdsRequest>>,
) -> Result<Json<ApiResponse<DeleteResponse>>, ApiError> {
    let file_ids = match body {
        Some(Json(req)) if !req.file_ids.is_empty() => req.file_ids,
        _ => vec![file_id],
    };

    let deleted = state.bulk.delete_many(&user, &file_ids).await?;
    Ok(Json(ApiResponse::new(DeleteResponse { deleted })))
}

/// PUT /api/files/rename/:file_id - Rename a file.
pub async fn rename_file(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(file_id): Path<i64>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, ApiError> {
    let metadata = state.catalog.rename(&user, file_id, &req.new_name).await?;
    Ok(Json(ApiResponse::new(FileResponse::from(metadata))))
}

/// GET /api/files/:file_id/activity - Activity log of a file, newest first.
pub async fn file_activity(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<ActivityResponse>>>, ApiError> {
    let entries = state.catalog.activity(&user, file_id).await?;
    let responses = entries.into_iter().map(ActivityResponse::from).collect();

    Ok(Json(ApiResponse::new(responses)))
}
