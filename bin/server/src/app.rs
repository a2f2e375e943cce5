//! HTTP router.

use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{self, AppState};
use crate::{access, logs, rooms};

/// Builds the API router over `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/AccessAttempt/attempt", post(access::attempt))
        .route("/api/Auth/is-token-valid", post(auth::is_token_valid))
        .route("/api/Auth/logout", post(auth::logout))
        .route("/api/AccessLogs", get(logs::list_access_logs))
        .route(
            "/api/Rooms/{room_id}/access/{employee_id}",
            put(rooms::grant_access).delete(rooms::revoke_access),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
