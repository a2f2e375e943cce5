//! In-memory store for tests, demos, and local development.
//!
//! Implements every storage contract the server needs so the whole request
//! path can run without a database.

use crate::model::{
    AccessLogEntry, AccessLogRecord, Employee, EnrolledFingerprint, Page, PageRequest, Room,
};
use crate::store::{AccessLogQuery, CredentialStore, GrantStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexus_core::{AccessLogId, EmployeeId, RoomId, StoreError};
use nexus_platform_access::{PermissionResolver, PermissionSet, Session, SessionStore, SessionToken};
use rootcause::Report;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct State {
    employees: BTreeMap<EmployeeId, Employee>,
    rooms: BTreeMap<RoomId, Room>,
    grants: HashSet<(EmployeeId, RoomId)>,
    logs: Vec<AccessLogRecord>,
    sessions: HashMap<String, Session>,
    role_permissions: HashMap<String, HashSet<String>>,
    employee_roles: HashMap<EmployeeId, HashSet<String>>,
}

/// Store holding all state behind a lock.
///
/// `set_unavailable(true)` makes every trait method fail with
/// `StoreError::Unavailable`, to exercise error paths.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
    unavailable: AtomicBool,
}

impl InMemoryStore {
    /// Creates an empty, available store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self) -> Result<(), Report<StoreError>> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::unavailable("in-memory store marked unavailable").into())
        } else {
            Ok(())
        }
    }

    /// Inserts or replaces an employee.
    pub fn add_employee(
        &self,
        id: EmployeeId,
        name: impl Into<String>,
        pin_code: Option<&str>,
        fingerprint_template: Option<Vec<u8>>,
    ) {
        let employee = Employee {
            id,
            name: name.into(),
            pin_code: pin_code.map(str::to_string),
            fingerprint_template,
        };
        self.write().employees.insert(id, employee);
    }

    /// Inserts or replaces an unoccupied room.
    pub fn add_room(&self, id: RoomId, name: impl Into<String>, description: impl Into<String>) {
        let room = Room {
            id,
            name: name.into(),
            description: description.into(),
            occupied: false,
            occupant: None,
        };
        self.write().rooms.insert(id, room);
    }

    /// Grants `employee_id` access to `room_id`.
    pub fn grant_room_access(&self, employee_id: EmployeeId, room_id: RoomId) {
        self.write().grants.insert((employee_id, room_id));
    }

    /// Gives `employee_id` the role named `role`.
    pub fn assign_role(&self, employee_id: EmployeeId, role: impl Into<String>) {
        self.write()
            .employee_roles
            .entry(employee_id)
            .or_default()
            .insert(role.into());
    }

    /// Links a permission key to a role.
    pub fn link_permission(&self, role: impl Into<String>, permission_key: impl Into<String>) {
        self.write()
            .role_permissions
            .entry(role.into())
            .or_default()
            .insert(permission_key.into());
    }

    /// Returns a snapshot of the access log in insertion order.
    #[must_use]
    pub fn access_logs(&self) -> Vec<AccessLogRecord> {
        self.read().logs.clone()
    }

    /// Returns the number of stored sessions, expired or not.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.read().sessions.len()
    }

    /// Makes every store operation fail with `StoreError::Unavailable`
    /// while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl CredentialStore for InMemoryStore {
    async fn find_room(&self, room_id: RoomId) -> Result<Option<Room>, Report<StoreError>> {
        self.check()?;
        Ok(self.read().rooms.get(&room_id).cloned())
    }

    async fn find_employees_by_pin(
        &self,
        pin_code: &str,
    ) -> Result<Vec<EmployeeId>, Report<StoreError>> {
        self.check()?;
        Ok(self
            .read()
            .employees
            .values()
            .filter(|e| e.pin_code.as_deref() == Some(pin_code))
            .map(|e| e.id)
            .collect())
    }

    async fn enrolled_fingerprints(&self) -> Result<Vec<EnrolledFingerprint>, Report<StoreError>> {
        self.check()?;
        Ok(self
            .read()
            .employees
            .values()
            .filter_map(|e| {
                e.fingerprint_template
                    .as_ref()
                    .map(|template| EnrolledFingerprint {
                        employee_id: e.id,
                        template: template.clone(),
                    })
            })
            .collect())
    }

    async fn has_room_access(
        &self,
        employee_id: EmployeeId,
        room_id: RoomId,
    ) -> Result<bool, Report<StoreError>> {
        self.check()?;
        Ok(self.read().grants.contains(&(employee_id, room_id)))
    }

    async fn append_access_log(
        &self,
        entry: &AccessLogEntry,
    ) -> Result<AccessLogId, Report<StoreError>> {
        self.check()?;
        let mut state = self.write();
        let id = AccessLogId::new(state.logs.len() as i64 + 1);
        state.logs.push(AccessLogRecord {
            id,
            entry: entry.clone(),
        });
        Ok(id)
    }
}

#[async_trait]
impl AccessLogQuery for InMemoryStore {
    async fn list_access_logs(
        &self,
        page: PageRequest,
    ) -> Result<Page<AccessLogRecord>, Report<StoreError>> {
        self.check()?;
        let state = self.read();
        let mut rows: Vec<&AccessLogRecord> = state.logs.iter().collect();
        rows.sort_by(|a, b| {
            b.entry
                .access_time
                .cmp(&a.entry.access_time)
                .then(b.id.cmp(&a.id))
        });
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let items = rows
            .into_iter()
            .skip(offset)
            .take(page.page_size as usize)
            .cloned()
            .collect();
        Ok(Page {
            items,
            total_count: state.logs.len() as u64,
            page_number: page.page_number,
            page_size: page.page_size,
        })
    }
}

#[async_trait]
impl GrantStore for InMemoryStore {
    async fn add_grant(
        &self,
        employee_id: EmployeeId,
        room_id: RoomId,
    ) -> Result<bool, Report<StoreError>> {
        self.check()?;
        let mut state = self.write();
        if !state.employees.contains_key(&employee_id) || !state.rooms.contains_key(&room_id) {
            return Ok(false);
        }
        state.grants.insert((employee_id, room_id));
        Ok(true)
    }

    async fn remove_grant(
        &self,
        employee_id: EmployeeId,
        room_id: RoomId,
    ) -> Result<bool, Report<StoreError>> {
        self.check()?;
        Ok(self.write().grants.remove(&(employee_id, room_id)))
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn find(&self, token: &SessionToken) -> Result<Option<Session>, Report<StoreError>> {
        self.check()?;
        Ok(self.read().sessions.get(token.as_str()).cloned())
    }

    async fn create(&self, session: &Session) -> Result<(), Report<StoreError>> {
        self.check()?;
        self.write()
            .sessions
            .insert(session.token().as_str().to_string(), session.clone());
        Ok(())
    }

    async fn delete(&self, token: &SessionToken) -> Result<bool, Report<StoreError>> {
        self.check()?;
        Ok(self.write().sessions.remove(token.as_str()).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, Report<StoreError>> {
        self.check()?;
        let mut state = self.write();
        let before = state.sessions.len();
        state.sessions.retain(|_, session| !session.is_expired_at(now));
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl PermissionResolver for InMemoryStore {
    async fn resolve_permissions(
        &self,
        employee_id: EmployeeId,
    ) -> Result<PermissionSet, Report<StoreError>> {
        self.check()?;
        let state = self.read();
        let Some(roles) = state.employee_roles.get(&employee_id) else {
            return Ok(PermissionSet::empty());
        };
        let keys = roles
            .iter()
            .filter_map(|role| state.role_permissions.get(role))
            .flatten();
        Ok(PermissionSet::from_keys(keys))
    }
}
