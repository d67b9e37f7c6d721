use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use eventgate::config::Config;
use eventgate::state::AppState;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN_SECRET: &str = "test-admin-secret";

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.auth.registrant_secret = "test-registrant-secret".to_string();
    config.auth.admin_secret = ADMIN_SECRET.to_string();
    config.auth.expose_otp_in_response = true;

    let state = AppState::new(config).await.expect("Failed to create app state");
    eventgate::api::router(state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

fn registration_body(email: &str, ticket_type: &str) -> Value {
    json!({
        "name": "Test Person",
        "email": email,
        "phone": "+1 555 000 1234",
        "gender": "other",
        "ticketType": ticket_type,
    })
}

async fn register(app: &Router, email: &str, ticket_type: &str) {
    let (status, _) = send(
        app,
        "POST",
        "/registration",
        None,
        Some(registration_body(email, ticket_type)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

/// Runs the request-otp / verify-otp dance and returns the session token.
async fn login(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/request-otp",
        None,
        Some(json!({ "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let code = body["data"]["devCode"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        "POST",
        "/auth/verify-otp",
        None,
        Some(json!({ "email": email, "otp": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn admin_token(app: &Router) -> String {
    let (status, _) = send(
        app,
        "POST",
        "/admin/create",
        None,
        Some(json!({
            "name": "Root Admin",
            "email": "admin@example.com",
            "password": "correct-horse",
            "secretKey": ADMIN_SECRET,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        "POST",
        "/admin/login",
        None,
        Some(json!({ "email": "admin@example.com", "password": "correct-horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = spawn_app().await;

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["database"], "ok");
}

#[tokio::test]
async fn test_registration_validation() {
    let app = spawn_app().await;

    let mut bad_phone = registration_body("a@example.com", "standard");
    bad_phone["phone"] = json!("12345");
    let (status, body) = send(&app, "POST", "/registration", None, Some(bad_phone)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let mut bad_ticket = registration_body("a@example.com", "standard");
    bad_ticket["ticketType"] = json!("platinum");
    let (status, _) = send(&app, "POST", "/registration", None, Some(bad_ticket)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut bad_email = registration_body("not-an-email", "standard");
    bad_email["email"] = json!("not-an-email");
    let (status, _) = send(&app, "POST", "/registration", None, Some(bad_email)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = spawn_app().await;

    register(&app, "dup@example.com", "standard").await;

    // Same address with different casing is still a duplicate.
    let (status, body) = send(
        &app,
        "POST",
        "/registration",
        None,
        Some(registration_body("DUP@Example.com", "vip")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_full_login_flow() {
    let app = spawn_app().await;

    register(&app, "flow@example.com", "vip").await;
    let token = login(&app, "flow@example.com").await;

    let (status, body) = send(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "flow@example.com");
    assert_eq!(body["data"]["ticketType"], "vip");
}

#[tokio::test]
async fn test_request_otp_for_unknown_email() {
    let app = spawn_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/auth/request-otp",
        None,
        Some(json!({ "email": "ghost@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_code_retries_then_success() {
    let app = spawn_app().await;

    register(&app, "retry@example.com", "standard").await;

    let (_, body) = send(
        &app,
        "POST",
        "/auth/request-otp",
        None,
        Some(json!({ "email": "retry@example.com" })),
    )
    .await;
    let code = body["data"]["devCode"].as_str().unwrap().to_string();
    let wrong = if code == "000000" { "000001" } else { "000000" };

    // Wrong guesses don't burn the challenge.
    for _ in 0..3 {
        let (status, _) = send(
            &app,
            "POST",
            "/auth/verify-otp",
            None,
            Some(json!({ "email": "retry@example.com", "otp": wrong })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, _) = send(
        &app,
        "POST",
        "/auth/verify-otp",
        None,
        Some(json!({ "email": "retry@example.com", "otp": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // But a consumed challenge is gone.
    let (status, _) = send(
        &app,
        "POST",
        "/auth/verify-otp",
        None,
        Some(json!({ "email": "retry@example.com", "otp": code })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_new_code_supersedes_old() {
    let app = spawn_app().await;

    register(&app, "super@example.com", "standard").await;

    let (_, body) = send(
        &app,
        "POST",
        "/auth/request-otp",
        None,
        Some(json!({ "email": "super@example.com" })),
    )
    .await;
    let first = body["data"]["devCode"].as_str().unwrap().to_string();

    let (_, body) = send(
        &app,
        "POST",
        "/auth/request-otp",
        None,
        Some(json!({ "email": "super@example.com" })),
    )
    .await;
    let second = body["data"]["devCode"].as_str().unwrap().to_string();

    if first != second {
        let (status, _) = send(
            &app,
            "POST",
            "/auth/verify-otp",
            None,
            Some(json!({ "email": "super@example.com", "otp": first })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (status, _) = send(
        &app,
        "POST",
        "/auth/verify-otp",
        None,
        Some(json!({ "email": "super@example.com", "otp": second })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_bootstrap_requires_secret() {
    let app = spawn_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/admin/create",
        None,
        Some(json!({
            "name": "Intruder",
            "email": "intruder@example.com",
            "password": "long-enough-pw",
            "secretKey": "wrong",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_login_rejects_bad_password() {
    let app = spawn_app().await;
    let _ = admin_token(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        "/admin/login",
        None,
        Some(json!({ "email": "admin@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_kinds_are_disjoint() {
    let app = spawn_app().await;

    register(&app, "cross@example.com", "standard").await;
    let registrant = login(&app, "cross@example.com").await;
    let admin = admin_token(&app).await;

    // Registrant token on an admin route.
    let (status, _) = send(&app, "GET", "/admin/stats", Some(&registrant), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Admin token on a registrant route.
    let (status, _) = send(&app, "GET", "/auth/me", Some(&admin), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // No token at all.
    let (status, _) = send(&app, "GET", "/admin/stats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_blocking_cuts_off_access() {
    let app = spawn_app().await;

    register(&app, "victim@example.com", "standard").await;
    let registrant = login(&app, "victim@example.com").await;
    let admin = admin_token(&app).await;

    // Find the registration id via the admin list.
    let (status, body) = send(&app, "GET", "/admin/registrations", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["data"]["registrations"][0]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/admin/registrations/{id}/status"),
        Some(&admin),
        Some(json!({ "status": "blocked" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "blocked");

    // A blocked account can't request codes and its live tokens stop working.
    let (status, _) = send(
        &app,
        "POST",
        "/auth/request-otp",
        None,
        Some(json!({ "email": "victim@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/auth/me", Some(&registrant), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Unblocking restores login.
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/admin/registrations/{id}/status"),
        Some(&admin),
        Some(json!({ "status": "active" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let _ = login(&app, "victim@example.com").await;
}

#[tokio::test]
async fn test_status_update_validation() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;

    let (status, _) = send(
        &app,
        "PATCH",
        "/admin/registrations/1/status",
        Some(&admin),
        Some(json!({ "status": "banned" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "PATCH",
        "/admin/registrations/999/status",
        Some(&admin),
        Some(json!({ "status": "blocked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_registration_list_filters_and_pagination() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;

    register(&app, "one@example.com", "standard").await;
    register(&app, "two@example.com", "vip").await;
    register(&app, "three@example.com", "standard").await;

    let (status, body) = send(
        &app,
        "GET",
        "/admin/registrations?ticketType=vip",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["registrations"][0]["email"], "two@example.com");
    assert_eq!(
        body["data"]["registrations"][0]["registrationSource"],
        "web"
    );

    let (status, body) = send(
        &app,
        "GET",
        "/admin/registrations?page=2&limit=2",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 3);
    assert_eq!(body["data"]["pagination"]["pages"], 2);
    assert_eq!(body["data"]["pagination"]["page"], 2);
    assert_eq!(body["data"]["registrations"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "GET",
        "/admin/registrations?search=three",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 1);
}

#[tokio::test]
async fn test_registration_export_csv() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;

    register(&app, "csv@example.com", "student").await;

    let request = Request::builder()
        .uri("/admin/registrations/export")
        .header("Authorization", format!("Bearer {admin}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("Content-Type")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("Name,Email,Phone,Gender,Ticket Type,Status,Registered At")
    );

    // Free-text fields are quoted even without embedded commas.
    let row = lines.next().unwrap();
    assert!(row.starts_with("\"Test Person\",csv@example.com,\"+1 555 000 1234\""));
}

#[tokio::test]
async fn test_stats_shape() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;

    register(&app, "s1@example.com", "vip").await;
    register(&app, "s2@example.com", "standard").await;
    let _ = login(&app, "s1@example.com").await;
    let _ = login(&app, "s1@example.com").await;

    let (status, body) = send(&app, "GET", "/admin/stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["totalRegistrations"], 2);
    assert_eq!(data["totalLogins"], 2);
    assert_eq!(data["uniqueLogins"], 1);
    assert_eq!(data["blockedUsers"], 0);
    assert_eq!(data["loginsByDay"].as_array().unwrap().len(), 7);
    assert_eq!(data["loginsByDay"][6]["count"], 2);
    assert_eq!(data["byTicketType"]["vip"], 1);
    assert_eq!(data["byTicketType"]["standard"], 1);
}

#[tokio::test]
async fn test_login_logs_capture_client_metadata() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;

    register(&app, "ua@example.com", "standard").await;

    let (_, body) = send(
        &app,
        "POST",
        "/auth/request-otp",
        None,
        Some(json!({ "email": "ua@example.com" })),
    )
    .await;
    let code = body["data"]["devCode"].as_str().unwrap().to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/auth/verify-otp")
        .header("Content-Type", "application/json")
        .header(
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
        )
        .body(Body::from(
            json!({ "email": "ua@example.com", "otp": code }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(&app, "GET", "/admin/login-logs", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total"], 1);
    assert_eq!(body["data"]["logs"][0]["browser"], "Chrome");
    assert_eq!(body["data"]["logs"][0]["os"], "Windows");
    assert_eq!(body["data"]["logs"][0]["device"], "Desktop");
}

#[tokio::test]
async fn test_content_urls_and_logging() {
    let app = spawn_app().await;

    register(&app, "viewer@example.com", "standard").await;
    let token = login(&app, "viewer@example.com").await;
    let admin = admin_token(&app).await;

    // Unauthenticated access is rejected.
    let (status, _) = send(&app, "GET", "/content/urls", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Admin sets the links; registrants see them.
    let (status, _) = send(
        &app,
        "PUT",
        "/admin/content-config",
        Some(&admin),
        Some(json!({ "videos": "https://cdn.example.com/videos" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/content/urls", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["videos"], "https://cdn.example.com/videos");

    // Valid access log.
    let (status, _) = send(
        &app,
        "POST",
        "/content/log",
        Some(&token),
        Some(json!({ "contentType": "videos" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Unknown category is rejected.
    let (status, _) = send(
        &app,
        "POST",
        "/content/log",
        Some(&token),
        Some(json!({ "contentType": "warez" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_content_config_listing_records_updater() {
    let app = spawn_app().await;
    let admin = admin_token(&app).await;

    let (status, _) = send(
        &app,
        "PUT",
        "/admin/content-config",
        Some(&admin),
        Some(json!({ "pdf": "https://cdn.example.com/brochure.pdf" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/admin/content-config", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();

    // Every key shows its effective URL, overridden or not.
    assert_eq!(items.len(), 3);

    let pdf = items.iter().find(|i| i["key"] == "pdf").unwrap();
    assert_eq!(pdf["url"], "https://cdn.example.com/brochure.pdf");
    assert_eq!(pdf["updatedBy"], "admin@example.com");

    let videos = items.iter().find(|i| i["key"] == "videos").unwrap();
    assert!(videos["updatedBy"].is_null());
}
