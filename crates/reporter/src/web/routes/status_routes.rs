use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pingboard_common::HostStatus;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::web::{AppError, AppState};

async fn get_statuses_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<HostStatus>>, AppError> {
    let statuses = app_state.store.list_statuses().await.map_err(|e| {
        error!(error = %e, "Failed to list host statuses.");
        AppError::from(e)
    })?;
    debug!(count = statuses.len(), "Serving host statuses.");
    Ok(Json(statuses))
}

// The body is decoded as JSON whatever its Content-Type says; only bad JSON
// or a wrongly shaped payload is a client error.
async fn update_status_handler(
    State(app_state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let status: HostStatus = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "Rejected malformed status report.");
        AppError::InvalidInput(format!("Invalid JSON: {e}"))
    })?;

    app_state.store.upsert_status(&status).await.map_err(|e| {
        error!(host = %status.host, error = %e, "Failed to store host status.");
        AppError::from(e)
    })?;

    debug!(host = %status.host, ping_time = status.latency_millis, "Stored host status.");
    Ok(StatusCode::CREATED)
}

pub fn create_status_router() -> Router<Arc<AppState>> {
    Router::new().route("/status", get(get_statuses_handler).post(update_status_handler))
}
