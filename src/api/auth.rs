use axum::{
    Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, ApiResponse};
use crate::entities::registrations;
use crate::services::{ClientInfo, TokenKind};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RequestOtpBody {
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOtpResponse {
    pub message: String,
    /// Echoed only when `expose_otp_in_response` is enabled in config.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyOtpBody {
    pub email: String,
    pub otp: String,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub token: String,
    pub name: String,
    pub email: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub ticket_type: String,
}

/// The registrant a verified bearer token resolved to, inserted into request
/// extensions by [`require_registrant`].
#[derive(Clone)]
pub struct CurrentRegistrant(pub registrations::Model);

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

fn client_info(headers: &HeaderMap) -> ClientInfo {
    ClientInfo {
        user_agent: headers
            .get("User-Agent")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string),
        ip: headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string()),
    }
}

/// Guards registrant routes. Verifies the bearer token, re-checks the account
/// against the store (a block takes effect immediately, outstanding tokens
/// included) and exposes the registrant to handlers.
pub async fn require_registrant(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let email = state
        .tokens
        .verify(TokenKind::Registrant, &token)
        .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

    let registrant = state
        .store
        .get_registration_by_email(&email)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("Unknown account"))?;

    if registrant.status == "blocked" {
        return Err(ApiError::Forbidden(
            "This account has been blocked".to_string(),
        ));
    }

    request.extensions_mut().insert(CurrentRegistrant(registrant));
    Ok(next.run(request).await)
}

/// POST /auth/request-otp
pub async fn request_otp(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RequestOtpBody>,
) -> Result<Json<ApiResponse<RequestOtpResponse>>, ApiError> {
    let email = body.email.trim();
    if email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    let code = state.otp.request_challenge(email).await?;

    Ok(Json(ApiResponse::success(RequestOtpResponse {
        message: "A login code has been sent to your email".to_string(),
        dev_code: state
            .config
            .auth
            .expose_otp_in_response
            .then_some(code),
    })))
}

/// POST /auth/verify-otp
pub async fn verify_otp(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<VerifyOtpBody>,
) -> Result<Json<ApiResponse<VerifyOtpResponse>>, ApiError> {
    let email = body.email.trim();
    let otp = body.otp.trim();
    if email.is_empty() || otp.is_empty() {
        return Err(ApiError::validation("Email and otp are required"));
    }

    let login = state
        .otp
        .verify_challenge(email, otp, &client_info(&headers))
        .await?;

    Ok(Json(ApiResponse::success(VerifyOtpResponse {
        token: login.token,
        name: login.name,
        email: login.email,
    })))
}

/// GET /auth/me
pub async fn me(
    axum::Extension(CurrentRegistrant(registrant)): axum::Extension<CurrentRegistrant>,
) -> Json<ApiResponse<MeResponse>> {
    Json(ApiResponse::success(MeResponse {
        name: registrant.name,
        email: registrant.email,
        phone: registrant.phone,
        gender: registrant.gender,
        ticket_type: registrant.ticket_type,
    }))
}
