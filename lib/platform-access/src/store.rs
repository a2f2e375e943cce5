//! Storage contracts used by the authorizer and the session sweeper.

use crate::permission::PermissionSet;
use crate::session::{Session, SessionToken};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexus_core::{EmployeeId, Result, StoreError};

/// Persistence for sessions.
///
/// Deletes are idempotent: removing an absent session is not an error, so
/// the authorizer's lazy eviction and the sweeper may race freely.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Finds a session by token.
    async fn find(&self, token: &SessionToken) -> Result<Option<Session>, StoreError>;

    /// Persists a newly issued session.
    async fn create(&self, session: &Session) -> Result<(), StoreError>;

    /// Deletes a session. Returns true if a row was removed.
    async fn delete(&self, token: &SessionToken) -> Result<bool, StoreError>;

    /// Deletes every session with `expiration <= now`. Returns the count removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}

/// Resolves the permissions an employee holds through their roles.
///
/// A relational join, a cache, or a static table are all valid backings.
#[async_trait]
pub trait PermissionResolver: Send + Sync {
    /// Returns every registered permission reachable from `employee_id`.
    async fn resolve_permissions(
        &self,
        employee_id: EmployeeId,
    ) -> Result<PermissionSet, StoreError>;
}
