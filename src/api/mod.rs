use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, patch, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod content;
mod error;
pub mod health;
pub mod registration;
mod types;

pub use error::ApiError;
pub use types::*;

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config.server.cors_allowed_origins.clone();

    let registrant_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/content/urls", get(content::urls))
        .route("/content/log", post(content::log_access))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_registrant,
        ));

    let admin_routes = Router::new()
        .route("/admin/registrations", get(admin::list_registrations))
        .route(
            "/admin/registrations/export",
            get(admin::export_registrations),
        )
        .route(
            "/admin/registrations/{id}/status",
            patch(admin::update_status),
        )
        .route("/admin/login-logs", get(admin::list_login_logs))
        .route("/admin/login-logs/export", get(admin::export_login_logs))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/content-config", get(admin::get_content_config))
        .route("/admin/content-config", put(admin::put_content_config))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::require_admin,
        ));

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/registration", post(registration::register))
        .route("/auth/request-otp", post(auth::request_otp))
        .route("/auth/verify-otp", post(auth::verify_otp))
        .route("/admin/login", post(admin::login))
        .route("/admin/create", post(admin::create))
        .route("/health", get(health::health))
        .merge(registrant_routes)
        .merge(admin_routes)
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}
