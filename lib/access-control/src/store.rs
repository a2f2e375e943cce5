//! Storage contracts for access evaluation.
//!
//! Each method is a single statement against the store. The evaluator never
//! needs a multi-row transaction: the log append is the only write.

use crate::model::{AccessLogEntry, AccessLogRecord, EnrolledFingerprint, Page, PageRequest, Room};
use async_trait::async_trait;
use nexus_core::{AccessLogId, EmployeeId, Result, RoomId, StoreError};

/// Reads credentials and grants, and appends to the access log.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Finds a room by id.
    async fn find_room(&self, room_id: RoomId) -> Result<Option<Room>, StoreError>;

    /// Returns every employee whose stored PIN equals `pin_code` exactly.
    async fn find_employees_by_pin(&self, pin_code: &str) -> Result<Vec<EmployeeId>, StoreError>;

    /// Returns all enrolled fingerprint templates in ascending employee id.
    async fn enrolled_fingerprints(&self) -> Result<Vec<EnrolledFingerprint>, StoreError>;

    /// Returns true if `employee_id` holds a grant for `room_id`.
    async fn has_room_access(
        &self,
        employee_id: EmployeeId,
        room_id: RoomId,
    ) -> Result<bool, StoreError>;

    /// Appends an access log entry.
    async fn append_access_log(&self, entry: &AccessLogEntry) -> Result<AccessLogId, StoreError>;
}

/// Paginated read access to the access log, newest first.
#[async_trait]
pub trait AccessLogQuery: Send + Sync {
    /// Returns one page of access log rows.
    async fn list_access_logs(
        &self,
        page: PageRequest,
    ) -> Result<Page<AccessLogRecord>, StoreError>;
}

/// Administrative management of room grants.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Grants `employee_id` access to `room_id`. Granting twice is a no-op.
    /// Returns false if the employee or the room does not exist.
    async fn add_grant(&self, employee_id: EmployeeId, room_id: RoomId) -> Result<bool, StoreError>;

    /// Removes a grant. Returns true if a grant was removed.
    async fn remove_grant(
        &self,
        employee_id: EmployeeId,
        room_id: RoomId,
    ) -> Result<bool, StoreError>;
}
