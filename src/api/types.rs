use serde::Serialize;

use crate::entities::{login_logs, registrations};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub ticket_type: String,
    pub status: String,
    pub registration_source: String,
    pub created_at: String,
}

impl From<registrations::Model> for RegistrationDto {
    fn from(model: registrations::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            gender: model.gender,
            ticket_type: model.ticket_type,
            status: model.status,
            registration_source: model.registration_source,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginLogDto {
    pub id: i64,
    pub email: String,
    pub login_time: String,
    pub browser: String,
    pub os: String,
    pub device: String,
    pub ip: Option<String>,
}

impl From<login_logs::Model> for LoginLogDto {
    fn from(model: login_logs::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            login_time: model.login_time,
            browser: model.browser,
            os: model.os,
            device: model.device,
            ip: model.ip,
        }
    }
}

/// Pager figures accompanying every list response.
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub pages: u64,
}

impl Pagination {
    #[must_use]
    pub fn new(total: u64, page: u64, page_size: u64) -> Self {
        let pages = if page_size == 0 {
            0
        } else {
            total.div_ceil(page_size)
        };
        Self { total, page, pages }
    }
}

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 200;

/// Normalizes raw 1-based pagination query parameters.
#[must_use]
pub fn page_params(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    (
        page.unwrap_or(1).max(1),
        limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
    )
}
