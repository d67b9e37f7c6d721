use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::auth::CurrentRegistrant;
use super::{ApiError, ApiResponse};
use crate::state::AppState;

pub const CONTENT_KEYS: &[&str] = &["videos", "pdf", "feedback"];

#[derive(Serialize)]
pub struct ContentUrlsResponse {
    pub videos: String,
    pub pdf: String,
    pub feedback: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentLogBody {
    pub content_type: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /content/urls
///
/// Config supplies the defaults; rows written through the admin surface
/// override them per key.
pub async fn urls(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ContentUrlsResponse>>, ApiError> {
    let mut videos = state.config.content.videos_url.clone();
    let mut pdf = state.config.content.pdf_url.clone();
    let mut feedback = state.config.content.feedback_url.clone();

    let overrides = state
        .store
        .list_content_config()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    for row in overrides {
        match row.key.as_str() {
            "videos" => videos = row.url,
            "pdf" => pdf = row.url,
            "feedback" => feedback = row.url,
            _ => {}
        }
    }

    Ok(Json(ApiResponse::success(ContentUrlsResponse {
        videos,
        pdf,
        feedback,
    })))
}

/// POST /content/log
pub async fn log_access(
    State(state): State<Arc<AppState>>,
    Extension(CurrentRegistrant(registrant)): Extension<CurrentRegistrant>,
    Json(body): Json<ContentLogBody>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !CONTENT_KEYS.contains(&body.content_type.as_str()) {
        return Err(ApiError::validation(
            "Content type must be one of: videos, pdf, feedback",
        ));
    }

    state
        .store
        .add_content_log(&registrant.email, &body.content_type)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    info!(email = %registrant.email, content_type = %body.content_type, "Content access logged");

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Access logged".to_string(),
    })))
}
