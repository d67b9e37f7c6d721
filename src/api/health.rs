use axum::{Json, extract::State};
use serde::Serialize;
use std::sync::Arc;

use super::ApiResponse;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: String,
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthResponse>> {
    let database = if state.store.ping().await.is_ok() {
        "ok"
    } else {
        "unreachable"
    };

    Json(ApiResponse::success(HealthResponse {
        status: "ok",
        database,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
