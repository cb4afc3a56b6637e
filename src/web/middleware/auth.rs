//! Session authentication middleware.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::db::User;
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Extractor for authenticated users.
///
/// Use this extractor to require a session for a handler. The bearer token
/// is resolved against the session store on every request, so a revoked
/// session is rejected immediately.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

        let user = state.sessions.validate(token).await.map_err(|e| {
            tracing::debug!("Session validation failed: {}", e);
            ApiError::from(e)
        })?;

        Ok(AuthUser(user))
    }
}
