//! Permission checks for bearer sessions.
//!
//! The authorizer resolves a token to a session, evicts it if it has
//! expired, and otherwise checks the requested permission against the
//! employee's role-derived permission set.

use crate::error::AuthorizationError;
use crate::permission::Permission;
use crate::session::{Session, SessionToken};
use crate::store::{PermissionResolver, SessionStore};
use nexus_core::{Clock, EmployeeId};
use rootcause::Report;
use rootcause::prelude::ResultExt;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Outcome of a permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    /// The session is live and holds the permission.
    Granted { employee_id: EmployeeId },
    /// The requirement is not met.
    Denied(DenialReason),
}

impl AuthorizationDecision {
    /// Returns true if the permission was granted.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

/// Why a permission check was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// No session exists for the token.
    SessionMissing,
    /// The session had expired; it has been deleted.
    SessionExpired,
    /// The session is live but no role grants the permission.
    PermissionMissing { employee_id: EmployeeId },
}

/// Liveness of a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// The session exists and has not expired.
    Active(Session),
    /// The session had expired; it has been deleted.
    Expired,
    /// No session exists for the token.
    Missing,
}

/// Decides whether a session may invoke a protected operation.
#[derive(Clone)]
pub struct Authorizer {
    sessions: Arc<dyn SessionStore>,
    permissions: Arc<dyn PermissionResolver>,
    clock: Arc<dyn Clock>,
}

impl Authorizer {
    /// Creates an authorizer over the given stores.
    #[must_use]
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        permissions: Arc<dyn PermissionResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            sessions,
            permissions,
            clock,
        }
    }

    /// Checks whether the session behind `token` holds `permission`.
    ///
    /// An expired session is deleted as a side effect.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailed` if a store could not be read. Lack of
    /// permission is reported as [`AuthorizationDecision::Denied`].
    #[instrument(skip(self, token), fields(permission = %permission))]
    pub async fn authorize(
        &self,
        token: &SessionToken,
        permission: Permission,
    ) -> Result<AuthorizationDecision, Report<AuthorizationError>> {
        let session = match self.session_status(token).await? {
            SessionStatus::Active(session) => session,
            SessionStatus::Expired => {
                return Ok(AuthorizationDecision::Denied(DenialReason::SessionExpired));
            }
            SessionStatus::Missing => {
                debug!("No session for presented token");
                return Ok(AuthorizationDecision::Denied(DenialReason::SessionMissing));
            }
        };

        let employee_id = session.employee_id();
        let held = self
            .permissions
            .resolve_permissions(employee_id)
            .await
            .context(AuthorizationError::StoreFailed)?;

        if held.contains(permission) {
            debug!(employee_id = %employee_id, "Permission granted");
            Ok(AuthorizationDecision::Granted { employee_id })
        } else {
            debug!(employee_id = %employee_id, "Permission not held");
            Ok(AuthorizationDecision::Denied(
                DenialReason::PermissionMissing { employee_id },
            ))
        }
    }

    /// Resolves `token` to a live session, deleting it if it has expired.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailed` if the session store could not be read or the
    /// expired session could not be deleted.
    pub async fn session_status(
        &self,
        token: &SessionToken,
    ) -> Result<SessionStatus, Report<AuthorizationError>> {
        let Some(session) = self
            .sessions
            .find(token)
            .await
            .context(AuthorizationError::StoreFailed)?
        else {
            return Ok(SessionStatus::Missing);
        };

        if session.is_expired_at(self.clock.now()) {
            self.sessions
                .delete(token)
                .await
                .context(AuthorizationError::StoreFailed)?;
            info!(
                employee_id = %session.employee_id(),
                "Removed expired session"
            );
            return Ok(SessionStatus::Expired);
        }

        Ok(SessionStatus::Active(session))
    }

    /// Deletes the session behind `token` (logout). Returns true if a
    /// session was removed; revoking an unknown token is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailed` if the session store could not be written.
    pub async fn revoke(&self, token: &SessionToken) -> Result<bool, Report<AuthorizationError>> {
        let removed = self
            .sessions
            .delete(token)
            .await
            .context(AuthorizationError::StoreFailed)?;
        if removed {
            info!("Session revoked");
        }
        Ok(removed)
    }
}
