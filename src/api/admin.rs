use axum::{
    Extension, Json,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::auth::bearer_token;
use super::types::{LoginLogDto, Pagination, RegistrationDto, page_params};
use super::{ApiError, ApiResponse};
use crate::db::{Admin, LoginLogFilter, RegistrationFilter};
use crate::services::export;
use crate::services::reporting::{self, StatsReport};
use crate::services::TokenKind;
use crate::state::AppState;

const MIN_PASSWORD_LENGTH: usize = 8;

/// The admin a verified bearer token resolved to, inserted into request
/// extensions by [`require_admin`].
#[derive(Clone)]
pub struct CurrentAdmin(pub Admin);

#[derive(Deserialize)]
pub struct AdminLoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreateBody {
    pub name: String,
    pub email: String,
    pub password: String,
    pub secret_key: String,
}

#[derive(Serialize)]
pub struct AdminCreateResponse {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub ticket_type: Option<String>,
    pub gender: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginLogListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Serialize)]
pub struct RegistrationListResponse {
    pub registrations: Vec<RegistrationDto>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct LoginLogListResponse {
    pub logs: Vec<LoginLogDto>,
    pub pagination: Pagination,
}

/// One resolved content link: the override when an admin has set one, the
/// configured default otherwise. Audit fields are present only for overrides.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentConfigDto {
    pub key: String,
    pub url: String,
    pub updated_by: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
pub struct ContentConfigBody {
    pub videos: Option<String>,
    pub pdf: Option<String>,
    pub feedback: Option<String>,
}

/// Guards admin routes with the admin token keyspace.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let email = state
        .tokens
        .verify(TokenKind::Admin, &token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    let admin = state
        .store
        .get_admin_by_email(&email)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("Unknown admin account"))?;

    request.extensions_mut().insert(CurrentAdmin(admin));
    Ok(next.run(request).await)
}

/// POST /admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdminLoginBody>,
) -> Result<Json<ApiResponse<AdminLoginResponse>>, ApiError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let admin = state
        .store
        .verify_admin_password(body.email.trim(), &body.password)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let token = state
        .tokens
        .mint(TokenKind::Admin, &admin.email)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!(email = %admin.email, "Admin logged in");

    Ok(Json(ApiResponse::success(AdminLoginResponse {
        token,
        name: admin.name,
        email: admin.email,
    })))
}

/// POST /admin/create
///
/// Bootstrap endpoint gated by the shared admin secret rather than an
/// existing admin session, so the first account can be created.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AdminCreateBody>,
) -> Result<Json<ApiResponse<AdminCreateResponse>>, ApiError> {
    if body.secret_key != state.config.auth.admin_secret {
        return Err(ApiError::Forbidden("Invalid secret key".to_string()));
    }
    if body.name.trim().is_empty() || body.email.trim().is_empty() {
        return Err(ApiError::validation("Name and email are required"));
    }
    if body.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::validation(
            "Password must be at least 8 characters",
        ));
    }

    if state
        .store
        .get_admin_by_email(body.email.trim())
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "An admin with this email already exists".to_string(),
        ));
    }

    let admin = state
        .store
        .create_admin(body.email.trim(), body.name.trim(), &body.password)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    info!(email = %admin.email, "Admin account created");

    Ok(Json(ApiResponse::success(AdminCreateResponse {
        name: admin.name,
        email: admin.email,
    })))
}

fn registration_filter(query: &RegistrationListQuery) -> RegistrationFilter {
    RegistrationFilter {
        search: query.search.clone().filter(|s| !s.is_empty()),
        ticket_type: query.ticket_type.clone().filter(|s| !s.is_empty()),
        gender: query.gender.clone().filter(|s| !s.is_empty()),
        start_date: query.start_date.clone().filter(|s| !s.is_empty()),
        end_date: query.end_date.clone().filter(|s| !s.is_empty()),
    }
}

/// GET /admin/registrations
pub async fn list_registrations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegistrationListQuery>,
) -> Result<Json<ApiResponse<RegistrationListResponse>>, ApiError> {
    let (page, limit) = page_params(query.page, query.limit);

    let (rows, total) = state
        .store
        .list_registrations(&registration_filter(&query), page, limit)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(RegistrationListResponse {
        registrations: rows.into_iter().map(RegistrationDto::from).collect(),
        pagination: Pagination::new(total, page, limit),
    })))
}

fn csv_response(filename: &str, csv: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response()
}

/// GET /admin/registrations/export
pub async fn export_registrations(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let rows = state
        .store
        .list_all_registrations()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(csv_response(
        "registrations.csv",
        export::registrations_csv(&rows),
    ))
}

/// PATCH /admin/registrations/{id}/status
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
    Path(id): Path<i32>,
    Json(body): Json<StatusBody>,
) -> Result<Json<ApiResponse<RegistrationDto>>, ApiError> {
    if body.status != "active" && body.status != "blocked" {
        return Err(ApiError::validation("Status must be active or blocked"));
    }

    let updated = state
        .store
        .update_registration_status(id, &body.status)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Registration {id} not found")))?;

    info!(
        admin = %admin.email,
        registration = id,
        status = %body.status,
        "Registration status updated"
    );

    Ok(Json(ApiResponse::success(RegistrationDto::from(updated))))
}

fn login_log_filter(query: &LoginLogListQuery) -> LoginLogFilter {
    LoginLogFilter {
        search: query.search.clone().filter(|s| !s.is_empty()),
        start_date: query.start_date.clone().filter(|s| !s.is_empty()),
        end_date: query.end_date.clone().filter(|s| !s.is_empty()),
    }
}

/// GET /admin/login-logs
pub async fn list_login_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginLogListQuery>,
) -> Result<Json<ApiResponse<LoginLogListResponse>>, ApiError> {
    let (page, limit) = page_params(query.page, query.limit);

    let (rows, total) = state
        .store
        .list_login_logs(&login_log_filter(&query), page, limit)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(LoginLogListResponse {
        logs: rows.into_iter().map(LoginLogDto::from).collect(),
        pagination: Pagination::new(total, page, limit),
    })))
}

/// GET /admin/login-logs/export
pub async fn export_login_logs(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let rows = state
        .store
        .list_all_login_logs()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(csv_response("login-logs.csv", export::login_logs_csv(&rows)))
}

/// GET /admin/stats
pub async fn stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<StatsReport>>, ApiError> {
    let report = reporting::build_stats(&state.store)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    Ok(Json(ApiResponse::success(report)))
}

/// GET /admin/content-config
///
/// Resolved per-key links, so admins see the effective URL even for keys
/// with no stored override.
pub async fn get_content_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ContentConfigDto>>>, ApiError> {
    let overrides = state
        .store
        .list_content_config()
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    let defaults = [
        ("videos", state.config.content.videos_url.clone()),
        ("pdf", state.config.content.pdf_url.clone()),
        ("feedback", state.config.content.feedback_url.clone()),
    ];

    let items = defaults
        .into_iter()
        .map(|(key, default_url)| {
            match overrides.iter().find(|row| row.key == key) {
                Some(row) => ContentConfigDto {
                    key: key.to_string(),
                    url: row.url.clone(),
                    updated_by: Some(row.updated_by.clone()),
                    updated_at: Some(row.updated_at.clone()),
                },
                None => ContentConfigDto {
                    key: key.to_string(),
                    url: default_url,
                    updated_by: None,
                    updated_at: None,
                },
            }
        })
        .collect();

    Ok(Json(ApiResponse::success(items)))
}

/// PUT /admin/content-config
pub async fn put_content_config(
    State(state): State<Arc<AppState>>,
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
    Json(body): Json<ContentConfigBody>,
) -> Result<Json<ApiResponse<Vec<ContentConfigDto>>>, ApiError> {
    let updates = [
        ("videos", body.videos),
        ("pdf", body.pdf),
        ("feedback", body.feedback),
    ];

    for (key, url) in updates {
        if let Some(url) = url {
            if url.trim().is_empty() {
                return Err(ApiError::validation(format!("URL for {key} is empty")));
            }
            state
                .store
                .upsert_content_url(key, url.trim(), &admin.email)
                .await
                .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        }
    }

    info!(admin = %admin.email, "Content config updated");

    get_content_config(State(state)).await
}
