//! Door access attempt route.
//!
//! Door controllers are not authenticated; the credential in the body is
//! the only proof of identity.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use nexus_access_control::{AccessAttempt, AccessOutcome, AttemptKind};
use nexus_core::RoomId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::AppState;
use crate::error::ApiError;

/// Body of an access attempt.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRequest {
    room_id: RoomId,
    attempt_type: String,
    #[serde(default)]
    pin_code: Option<String>,
    #[serde(default, alias = "fingerprintData")]
    fingerprint_data_base64: Option<String>,
}

impl AttemptRequest {
    fn into_attempt(self) -> Result<AccessAttempt, ApiError> {
        let kind = self
            .attempt_type
            .parse::<AttemptKind>()
            .map_err(|e| ApiError::bad_request(e.to_string()))?;
        let raw_fingerprint = self
            .fingerprint_data_base64
            .map(|data| STANDARD.decode(data.trim()))
            .transpose()
            .map_err(|_| ApiError::bad_request("fingerprint data is not valid base64"))?;

        Ok(AccessAttempt {
            room_id: self.room_id,
            kind,
            pin_code: self.pin_code,
            raw_fingerprint,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResponse {
    access_granted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
}

/// Evaluates an access attempt and tells the door whether to open.
///
/// The evaluation runs on its own task so a dropped connection cannot
/// abandon it between identity resolution and the log write.
pub async fn attempt(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AttemptRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let attempt = request.into_attempt()?;

    let evaluator = state.evaluator.clone();
    let decision = tokio::spawn(async move { evaluator.evaluate(attempt).await })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Access evaluation task failed");
            ApiError::Internal
        })??;

    let (status, reason) = match decision.outcome {
        AccessOutcome::Granted => (StatusCode::OK, None),
        AccessOutcome::Forbidden => (StatusCode::FORBIDDEN, Some("forbidden")),
        AccessOutcome::Unrecognized => (StatusCode::FORBIDDEN, Some("unrecognized_credential")),
    };
    let body = AttemptResponse {
        access_granted: decision.granted(),
        reason,
    };
    Ok((status, Json(body)).into_response())
}
