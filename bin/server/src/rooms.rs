//! Admin management of room grants.

use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
};
use nexus_core::{EmployeeId, RoomId};
use std::sync::Arc;

use crate::auth::{AdminAccess, AppState, RequirePermission};
use crate::error::ApiError;

type GrantPath = Result<Path<(RoomId, EmployeeId)>, PathRejection>;

/// Grants an employee access to a room.
pub async fn grant_access(
    admin: RequirePermission<AdminAccess>,
    State(state): State<Arc<AppState>>,
    path: GrantPath,
) -> Result<StatusCode, ApiError> {
    let Path((room_id, employee_id)) = path.map_err(|e| ApiError::bad_request(e.body_text()))?;

    if !state.grants.add_grant(employee_id, room_id).await? {
        return Err(ApiError::not_found("employee or room not found"));
    }
    tracing::info!(
        admin_id = %admin.employee_id,
        employee_id = %employee_id,
        room_id = %room_id,
        "Room access granted"
    );
    Ok(StatusCode::NO_CONTENT)
}

/// Revokes an employee's access to a room.
pub async fn revoke_access(
    admin: RequirePermission<AdminAccess>,
    State(state): State<Arc<AppState>>,
    path: GrantPath,
) -> Result<StatusCode, ApiError> {
    let Path((room_id, employee_id)) = path.map_err(|e| ApiError::bad_request(e.body_text()))?;

    if !state.grants.remove_grant(employee_id, room_id).await? {
        return Err(ApiError::not_found("grant not found"));
    }
    tracing::info!(
        admin_id = %admin.employee_id,
        employee_id = %employee_id,
        room_id = %room_id,
        "Room access revoked"
    );
    Ok(StatusCode::NO_CONTENT)
}
