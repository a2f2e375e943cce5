//! Paginated access log listing.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use chrono::{DateTime, Utc};
use nexus_access_control::{AccessLogRecord, PageRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{AppState, RequirePermission, ViewAccessLogs};
use crate::error::ApiError;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    page_number: Option<u32>,
    page_size: Option<u32>,
}

impl PageQuery {
    fn into_request(self) -> Result<PageRequest, ApiError> {
        let page_number = self.page_number.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_number == 0 || page_size == 0 {
            return Err(ApiError::bad_request(
                "pageNumber and pageSize must be positive",
            ));
        }
        Ok(PageRequest {
            page_number,
            page_size: page_size.min(MAX_PAGE_SIZE),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogView {
    log_id: i64,
    employee_id: Option<i32>,
    room_id: i32,
    access_time: DateTime<Utc>,
    access_granted: bool,
}

impl From<AccessLogRecord> for AccessLogView {
    fn from(record: AccessLogRecord) -> Self {
        Self {
            log_id: record.id.get(),
            employee_id: record.entry.employee_id.map(|id| id.get()),
            room_id: record.entry.room_id.get(),
            access_time: record.entry.access_time,
            access_granted: record.entry.access_granted,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessLogPage {
    items: Vec<AccessLogView>,
    total_count: u64,
    page_number: u32,
    page_size: u32,
}

/// Lists access log entries, newest first.
pub async fn list_access_logs(
    _auth: RequirePermission<ViewAccessLogs>,
    State(state): State<Arc<AppState>>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<AccessLogPage>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let page = state.access_logs.list_access_logs(query.into_request()?).await?;

    Ok(Json(AccessLogPage {
        items: page.items.into_iter().map(AccessLogView::from).collect(),
        total_count: page.total_count,
        page_number: page.page_number,
        page_size: page.page_size,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults() {
        let page = PageQuery::default().into_request().expect("page");
        assert_eq!(page.page_number, 1);
        assert_eq!(page.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn page_size_is_capped() {
        let page = PageQuery {
            page_number: Some(2),
            page_size: Some(1000),
        }
        .into_request()
        .expect("page");
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn zero_values_are_rejected() {
        let zero_number = PageQuery {
            page_number: Some(0),
            page_size: None,
        };
        assert!(zero_number.into_request().is_err());

        let zero_size = PageQuery {
            page_number: None,
            page_size: Some(0),
        };
        assert!(zero_size.into_request().is_err());
    }
}
