use axum::{Json, extract::State, http::StatusCode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

use super::{ApiError, ApiResponse};
use crate::db::NewRegistration;
use crate::state::AppState;

const GENDERS: &[&str] = &["male", "female", "other", "prefer-not-to-say"];
const TICKET_TYPES: &[&str] = &["standard", "vip", "premium", "student"];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-+()]{10,}$").expect("phone regex is valid"));

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub ticket_type: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub name: String,
    pub email: String,
}

fn validate(body: &RegisterBody) -> Result<(), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::validation("Name is required"));
    }
    if !EMAIL_RE.is_match(body.email.trim()) {
        return Err(ApiError::validation("A valid email is required"));
    }
    if !PHONE_RE.is_match(body.phone.trim()) {
        return Err(ApiError::validation(
            "Phone must be at least 10 characters of digits, spaces, dashes, plus or parentheses",
        ));
    }
    if !GENDERS.contains(&body.gender.as_str()) {
        return Err(ApiError::validation(
            "Gender must be one of: male, female, other, prefer-not-to-say",
        ));
    }
    if !TICKET_TYPES.contains(&body.ticket_type.as_str()) {
        return Err(ApiError::validation(
            "Ticket type must be one of: standard, vip, premium, student",
        ));
    }
    Ok(())
}

/// POST /registration
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<ApiResponse<RegisterResponse>>), ApiError> {
    validate(&body)?;

    let email = body.email.trim().to_lowercase();

    if state
        .store
        .get_registration_by_email(&email)
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?
        .is_some()
    {
        return Err(ApiError::Conflict(
            "This email is already registered".to_string(),
        ));
    }

    let created = state
        .store
        .create_registration(&NewRegistration {
            name: body.name.trim().to_string(),
            email,
            phone: body.phone.trim().to_string(),
            gender: body.gender.clone(),
            ticket_type: body.ticket_type.clone(),
            source: "web".to_string(),
        })
        .await
        .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

    info!(email = %created.email, ticket_type = %created.ticket_type, "New registration");

    // Confirmation mail is best effort.
    if let Err(e) = state
        .mailer
        .send_registration_confirmation(&created.email, &created.name)
        .await
    {
        warn!(email = %created.email, error = %e, "Failed to send confirmation email");
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(RegisterResponse {
            name: created.name,
            email: created.email,
        })),
    ))
}
