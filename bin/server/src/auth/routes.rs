//! Session routes for token liveness checks and logout.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use nexus_platform_access::{SessionStatus, SessionToken};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{AppState, BearerToken};
use crate::error::ApiError;

/// Body of a token liveness check.
#[derive(Debug, Deserialize)]
pub struct TokenValidityRequest {
    token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenValidityResponse {
    is_valid: bool,
}

/// Reports whether a token backs a live session. An expired session is
/// deleted as a side effect.
pub async fn is_token_valid(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TokenValidityRequest>, JsonRejection>,
) -> Result<Json<TokenValidityResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let status = state
        .authorizer
        .session_status(&SessionToken::new(request.token))
        .await?;

    Ok(Json(TokenValidityResponse {
        is_valid: matches!(status, SessionStatus::Active(_)),
    }))
}

/// Logs out the caller by deleting their session.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, ApiError> {
    state.authorizer.revoke(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
