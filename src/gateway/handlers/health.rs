//! Health check handler

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{Json, extract::State};

use super::super::state::AppState;
use super::super::types::{ApiResponse, HealthResponse};

/// Health check endpoint
///
/// GET /health
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<HealthResponse>> {
    let timestamp_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    Json(ApiResponse::success(HealthResponse {
        timestamp_ms,
        endpoints: state.dispatcher.registry().keys(),
        dispatch: state.dispatcher.stats(),
    }))
}
