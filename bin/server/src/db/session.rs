//! Repository for bearer sessions and role-derived permissions.

use super::store_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexus_core::{EmployeeId, StoreError};
use nexus_platform_access::{PermissionResolver, PermissionSet, Session, SessionStore, SessionToken};
use rootcause::Report;
use sqlx::{FromRow, PgPool};

/// Row type for session queries.
#[derive(FromRow)]
struct SessionRow {
    token: String,
    employee_id: i32,
    expiration: DateTime<Utc>,
}

impl From<SessionRow> for Session {
    fn from(row: SessionRow) -> Self {
        Session::new(
            SessionToken::new(row.token),
            EmployeeId::new(row.employee_id),
            row.expiration,
        )
    }
}

/// Repository over `user_tokens` and the role/permission join tables.
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    /// Creates a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionRepository {
    async fn find(&self, token: &SessionToken) -> Result<Option<Session>, Report<StoreError>> {
        let row: Option<SessionRow> = sqlx::query_as(
            r#"
            SELECT token, employee_id, expiration
            FROM user_tokens
            WHERE token = $1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(row.map(Session::from))
    }

    async fn create(&self, session: &Session) -> Result<(), Report<StoreError>> {
        sqlx::query(
            r#"
            INSERT INTO user_tokens (token, employee_id, expiration)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(session.token().as_str())
        .bind(session.employee_id().get())
        .bind(session.expiration())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(())
    }

    async fn delete(&self, token: &SessionToken) -> Result<bool, Report<StoreError>> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_tokens
            WHERE token = $1
            "#,
        )
        .bind(token.as_str())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, Report<StoreError>> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_tokens
            WHERE expiration <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl PermissionResolver for PgSessionRepository {
    async fn resolve_permissions(
        &self,
        employee_id: EmployeeId,
    ) -> Result<PermissionSet, Report<StoreError>> {
        let keys: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT p.permission_key
            FROM employee_roles er
            JOIN role_permissions rp ON rp.role_id = er.role_id
            JOIN permissions p ON p.permission_id = rp.permission_id
            WHERE er.employee_id = $1
            "#,
        )
        .bind(employee_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(PermissionSet::from_keys(keys))
    }
}
