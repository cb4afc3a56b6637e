//! Authentication handlers.

use std::str::FromStr;
use std::sync::Arc;

use axum::{extract::State, Json};

use crate::auth::VerifiedIdentity;
use crate::datetime::to_rfc3339;
use crate::storage::Platform;
use crate::web::dto::{ApiResponse, LoginRequest, LoginResponse, UserInfo};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// POST /api/auth/login - Log a platform-verified identity in.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let platform = Platform::from_str(&req.platform)
        .map_err(|_| ApiError::bad_request(format!("Unknown platform: {}", req.platform)))?;

    let identity = VerifiedIdentity {
        platform,
        external_id: req.external_id,
        username: req.username,
        first_name: req.first_name,
        last_name: req.last_name,
    };

    let (user, session) = state.sessions.login(&identity).await?;
    tracing::info!(user_id = user.id, platform = %platform, "user logged in");

    let response = LoginResponse {
        token: session.token,
        expires_at: to_rfc3339(&session.expires_at),
        user: UserInfo::from(user),
    };

    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/auth/logout - Revoke every session of the current user.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let revoked = state.sessions.revoke_all(user.id).await?;
    tracing::info!(user_id = user.id, revoked, "user logged out everywhere");

    Ok(Json(ApiResponse::new(())))
}
