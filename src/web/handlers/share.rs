//! Share link handlers for the Web API.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};

use crate::datetime::to_rfc3339;
use crate::web::dto::{ApiResponse, ShareLinkResponse};
use crate::web::error::ApiError;
use crate::web::handlers::files::attachment_response;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// POST /api/files/share/:file_id - Mint a time-limited share link.
pub async fn create_share(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(file_id): Path<i64>,
) -> Result<Json<ApiResponse<ShareLinkResponse>>, ApiError> {
    let link = state.shares.create(&user, file_id).await?;

    let response = ShareLinkResponse {
        url: state.shares.share_url(&link.token),
        token: link.token,
        expires_at: to_rfc3339(&link.expires_at),
    };

    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/files/share/:token - Resolve a share link.
///
/// Public: no session required, and the download is not attributed to
/// anyone in the activity log.
pub async fn resolve_share(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Response, ApiError> {
    let shared = state.shares.resolve(&token).await?;
    attachment_response(&shared.file_name, shared.content)
}
