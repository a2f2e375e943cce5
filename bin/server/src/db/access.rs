//! Repository for credentials, room grants, and the access log.

use super::store_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexus_access_control::{
    AccessLogEntry, AccessLogQuery, AccessLogRecord, CredentialStore, EnrolledFingerprint,
    GrantStore, Page, PageRequest, Room,
};
use nexus_core::{AccessLogId, EmployeeId, RoomId, StoreError};
use rootcause::Report;
use sqlx::{FromRow, PgPool};

/// Row type for room queries.
#[derive(FromRow)]
struct RoomRow {
    room_id: i32,
    name: String,
    description: Option<String>,
    occupied: bool,
    occupant_id: Option<i32>,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Self {
            id: RoomId::new(row.room_id),
            name: row.name,
            description: row.description.unwrap_or_default(),
            occupied: row.occupied,
            occupant: row.occupant_id.map(EmployeeId::new),
        }
    }
}

/// Row type for enrolled fingerprint queries.
#[derive(FromRow)]
struct FingerprintRow {
    employee_id: i32,
    fingerprint_template: Vec<u8>,
}

/// Row type for access log queries.
#[derive(FromRow)]
struct AccessLogRow {
    log_id: i64,
    employee_id: Option<i32>,
    room_id: i32,
    access_time: DateTime<Utc>,
    access_granted: bool,
}

impl From<AccessLogRow> for AccessLogRecord {
    fn from(row: AccessLogRow) -> Self {
        Self {
            id: AccessLogId::new(row.log_id),
            entry: AccessLogEntry {
                employee_id: row.employee_id.map(EmployeeId::new),
                room_id: RoomId::new(row.room_id),
                access_time: row.access_time,
                access_granted: row.access_granted,
            },
        }
    }
}

/// Repository over the `employees`, `rooms`, `employee_room_access`, and
/// `access_logs` tables.
#[derive(Clone)]
pub struct PgAccessRepository {
    pool: PgPool,
}

impl PgAccessRepository {
    /// Creates a new access repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgAccessRepository {
    async fn find_room(&self, room_id: RoomId) -> Result<Option<Room>, Report<StoreError>> {
        let row: Option<RoomRow> = sqlx::query_as(
            r#"
            SELECT room_id, name, description, occupied, occupant_id
            FROM rooms
            WHERE room_id = $1
            "#,
        )
        .bind(room_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Room::from))
    }

    async fn find_employees_by_pin(
        &self,
        pin_code: &str,
    ) -> Result<Vec<EmployeeId>, Report<StoreError>> {
        let ids: Vec<i32> = sqlx::query_scalar(
            r#"
            SELECT employee_id
            FROM employees
            WHERE pin_code = $1
            ORDER BY employee_id
            "#,
        )
        .bind(pin_code)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(ids.into_iter().map(EmployeeId::new).collect())
    }

    async fn enrolled_fingerprints(&self) -> Result<Vec<EnrolledFingerprint>, Report<StoreError>> {
        let rows: Vec<FingerprintRow> = sqlx::query_as(
            r#"
            SELECT employee_id, fingerprint_template
            FROM employees
            WHERE fingerprint_template IS NOT NULL
            ORDER BY employee_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows
            .into_iter()
            .map(|row| EnrolledFingerprint {
                employee_id: EmployeeId::new(row.employee_id),
                template: row.fingerprint_template,
            })
            .collect())
    }

    async fn has_room_access(
        &self,
        employee_id: EmployeeId,
        room_id: RoomId,
    ) -> Result<bool, Report<StoreError>> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM employee_room_access
                WHERE employee_id = $1 AND room_id = $2
            )
            "#,
        )
        .bind(employee_id.get())
        .bind(room_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)
    }

    async fn append_access_log(
        &self,
        entry: &AccessLogEntry,
    ) -> Result<AccessLogId, Report<StoreError>> {
        let log_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO access_logs (employee_id, room_id, access_time, access_granted)
            VALUES ($1, $2, $3, $4)
            RETURNING log_id
            "#,
        )
        .bind(entry.employee_id.map(|id| id.get()))
        .bind(entry.room_id.get())
        .bind(entry.access_time)
        .bind(entry.access_granted)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(AccessLogId::new(log_id))
    }
}

#[async_trait]
impl AccessLogQuery for PgAccessRepository {
    async fn list_access_logs(
        &self,
        page: PageRequest,
    ) -> Result<Page<AccessLogRecord>, Report<StoreError>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM access_logs")
            .fetch_one(&self.pool)
            .await
            .map_err(store_error)?;
        let total_count = u64::try_from(total)
            .map_err(|_| StoreError::corrupt(format!("negative access log count {total}")))?;

        let offset = i64::try_from(page.offset())
            .map_err(|_| StoreError::corrupt("page offset out of range"))?;
        let rows: Vec<AccessLogRow> = sqlx::query_as(
            r#"
            SELECT log_id, employee_id, room_id, access_time, access_granted
            FROM access_logs
            ORDER BY access_time DESC, log_id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page.page_size))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(Page {
            items: rows.into_iter().map(AccessLogRecord::from).collect(),
            total_count,
            page_number: page.page_number,
            page_size: page.page_size,
        })
    }
}

#[async_trait]
impl GrantStore for PgAccessRepository {
    async fn add_grant(
        &self,
        employee_id: EmployeeId,
        room_id: RoomId,
    ) -> Result<bool, Report<StoreError>> {
        let known: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM employees WHERE employee_id = $1)
               AND EXISTS (SELECT 1 FROM rooms WHERE room_id = $2)
            "#,
        )
        .bind(employee_id.get())
        .bind(room_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(store_error)?;
        if !known {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO employee_room_access (employee_id, room_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(employee_id.get())
        .bind(room_id.get())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(true)
    }

    async fn remove_grant(
        &self,
        employee_id: EmployeeId,
        room_id: RoomId,
    ) -> Result<bool, Report<StoreError>> {
        let result = sqlx::query(
            r#"
            DELETE FROM employee_room_access
            WHERE employee_id = $1 AND room_id = $2
            "#,
        )
        .bind(employee_id.get())
        .bind(room_id.get())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}
