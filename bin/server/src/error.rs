//! HTTP error responses.
//!
//! Domain reports are converted here into a status code and a user-safe
//! message. Internal details only reach the log.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nexus_access_control::AccessError;
use nexus_core::StoreError;
use nexus_platform_access::AuthorizationError;
use rootcause::Report;
use serde::Serialize;
use std::fmt;

/// Error body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request is malformed or names something that does not exist.
    BadRequest { message: String },
    /// The addressed resource does not exist.
    NotFound { message: String },
    /// The server failed; details have been logged.
    Internal,
}

impl ApiError {
    /// Creates a `400` error with a user-facing message.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a `404` error with a user-facing message.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest { message } | Self::NotFound { message } => f.write_str(message),
            Self::Internal => write!(f, "Internal server error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<Report<AccessError>> for ApiError {
    fn from(report: Report<AccessError>) -> Self {
        let context = report.current_context();
        if context.is_client_error() {
            tracing::debug!(error = %report, "Rejected access attempt");
            Self::bad_request(context.to_string())
        } else {
            tracing::error!(error = %report, "Access evaluation failed");
            Self::Internal
        }
    }
}

impl From<Report<AuthorizationError>> for ApiError {
    fn from(report: Report<AuthorizationError>) -> Self {
        tracing::error!(error = %report, "Authorization check failed");
        Self::Internal
    }
}

impl From<Report<StoreError>> for ApiError {
    fn from(report: Report<StoreError>) -> Self {
        tracing::error!(error = %report, "Store operation failed");
        Self::Internal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::RoomId;

    #[test]
    fn client_access_errors_are_bad_requests() {
        let report: Report<AccessError> = AccessError::RoomNotFound {
            room_id: RoomId::new(999),
        }
        .into();
        let err = ApiError::from(report);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("999"));
    }

    #[test]
    fn store_failures_are_internal() {
        let report: Report<AccessError> = AccessError::StoreFailed.into();
        let err = ApiError::from(report);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
    }
}
