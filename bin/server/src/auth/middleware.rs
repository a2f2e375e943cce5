//! Authentication extractors for Axum.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use nexus_core::EmployeeId;
use nexus_platform_access::{AuthorizationDecision, Permission, SessionToken};
use std::marker::PhantomData;
use std::sync::Arc;

use super::AppState;
use crate::error::ErrorBody;

/// Marker for a permission an extractor demands.
pub trait RequiredPermission: Send + Sync + 'static {
    const PERMISSION: Permission;
}

/// Requires [`Permission::AdminAccess`].
pub struct AdminAccess;

impl RequiredPermission for AdminAccess {
    const PERMISSION: Permission = Permission::AdminAccess;
}

/// Requires [`Permission::ViewAccessLogs`].
pub struct ViewAccessLogs;

impl RequiredPermission for ViewAccessLogs {
    const PERMISSION: Permission = Permission::ViewAccessLogs;
}

/// The token from an `Authorization: Bearer` header.
pub struct BearerToken(pub SessionToken);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthRejection::MissingToken)?;

        Ok(BearerToken(SessionToken::from(bearer.token())))
    }
}

/// Extractor for requiring a live session that holds `P`'s permission.
pub struct RequirePermission<P> {
    pub employee_id: EmployeeId,
    _permission: PhantomData<fn() -> P>,
}

impl<S, P> FromRequestParts<S> for RequirePermission<P>
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
    P: RequiredPermission,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let app_state = Arc::<AppState>::from_ref(state);

        let permission = P::PERMISSION;

        match app_state.authorizer.authorize(&token, permission).await {
            Ok(AuthorizationDecision::Granted { employee_id }) => Ok(RequirePermission {
                employee_id,
                _permission: PhantomData,
            }),
            Ok(AuthorizationDecision::Denied(reason)) => {
                tracing::debug!(?reason, %permission, "Request denied");
                Err(AuthRejection::Forbidden)
            }
            Err(e) => {
                tracing::error!(error = %e, "Authorization check failed");
                Err(AuthRejection::InternalError)
            }
        }
    }
}

/// Rejection type for authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    MissingToken,
    Forbidden,
    InternalError,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Missing bearer token"),
            Self::Forbidden => (StatusCode::FORBIDDEN, "Access denied"),
            Self::InternalError => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };
        let body = ErrorBody {
            error: message.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
