//! Authentication module for the Nexus server.
//!
//! This module provides:
//! - Bearer token and permission extractors for Axum routes
//! - Token liveness and logout routes
//!
//! Sessions are issued by the login service and stored in `user_tokens`.
//! Every protected request resolves its token through the `Authorizer`, so
//! a revoked or expired session stops working immediately.

pub mod middleware;
pub mod routes;

use nexus_access_control::{AccessEvaluator, AccessLogQuery, GrantStore};
use nexus_platform_access::Authorizer;
use std::sync::Arc;

pub use middleware::{
    AdminAccess, BearerToken, RequirePermission, RequiredPermission, ViewAccessLogs,
};
pub use routes::{is_token_valid, logout};

/// Shared application state.
pub struct AppState {
    /// Decides door access attempts.
    pub evaluator: AccessEvaluator,
    /// Checks bearer sessions and permissions.
    pub authorizer: Authorizer,
    /// Read access to the access log.
    pub access_logs: Arc<dyn AccessLogQuery>,
    /// Admin management of room grants.
    pub grants: Arc<dyn GrantStore>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        evaluator: AccessEvaluator,
        authorizer: Authorizer,
        access_logs: Arc<dyn AccessLogQuery>,
        grants: Arc<dyn GrantStore>,
    ) -> Self {
        Self {
            evaluator,
            authorizer,
            access_logs,
            grants,
        }
    }
}
