use axum::http::StatusCode;
use axum::http::header;
use chrono::{Duration, Utc};
use serde_json::Value;
use serde_json::json;

use super::common::{TEST_PASSWORD, create_test_app, default_settings, register_venue};
use crate::auth;
use crate::db::{self, Role, TenantStore, UserStore};

#[tokio::test]
async fn test_register_creates_trial_venue() {
    let app = create_test_app(default_settings()).await;

    let body = register_venue(&app.server, "owner@cafe.test").await;

    assert!(body["token"].is_string());
    assert_eq!(body["user"]["email"], "owner@cafe.test");
    assert_eq!(body["user"]["role"], "BusinessOwner");
    assert_eq!(body["tenant"]["planType"], "Trial");
    assert_eq!(body["tenant"]["isTrial"], true);
    assert_eq!(body["tenant"]["remainingTrialSeconds"], 1800);
    assert_eq!(body["tenant"]["id"], body["user"]["tenantId"]);
}

#[tokio::test]
async fn test_register_token_carries_tenant() {
    let app = create_test_app(default_settings()).await;

    let body = register_venue(&app.server, "owner@cafe.test").await;
    let token = body["token"].as_str().unwrap();

    let claims = auth::decode_unverified(token).unwrap();
    assert_eq!(claims.tenant_id().unwrap(), body["tenant"]["id"].as_str().unwrap());
    assert_eq!(claims.user_id().unwrap(), body["user"]["id"].as_str().unwrap());
    assert_eq!(claims.email().unwrap(), "owner@cafe.test");
    assert_eq!(claims.name.as_deref(), Some("Ana Costa"));
    assert_eq!(claims.role.as_deref(), Some("BusinessOwner"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = create_test_app(default_settings()).await;
    register_venue(&app.server, "owner@cafe.test").await;

    // emails compare case-insensitively
    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "email": "  Owner@Cafe.TEST ",
            "password": "another_password",
            "fullName": "Someone Else",
            "venueName": "Second Venue",
            "location": "Porto"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email already registered");
}

#[tokio::test]
async fn test_register_rejects_blank_fields() {
    let app = create_test_app(default_settings()).await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "email": "owner@cafe.test",
            "password": "",
            "fullName": "Ana Costa",
            "venueName": "Corner Cafe",
            "location": "Lisbon"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_register_rejects_system_admin_role() {
    let app = create_test_app(default_settings()).await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "email": "root@cafe.test",
            "password": TEST_PASSWORD,
            "fullName": "Root",
            "venueName": "Corner Cafe",
            "location": "Lisbon",
            "role": "SystemAdmin"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_success() {
    let app = create_test_app(default_settings()).await;
    let registered = register_venue(&app.server, "owner@cafe.test").await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "email": "OWNER@cafe.test",
            "password": TEST_PASSWORD
        }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["id"], registered["user"]["id"]);
    assert_eq!(body["tenant"]["id"], registered["tenant"]["id"]);

    let remaining = body["tenant"]["remainingTrialSeconds"].as_i64().unwrap();
    assert!((1790..=1800).contains(&remaining));

    let claims = auth::verify_session_token(&app.context.jwt, body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.tenant_id, registered["tenant"]["id"].as_str().unwrap());
}

#[tokio::test]
async fn test_login_clamps_elapsed_trial_to_zero() {
    let app = create_test_app(default_settings()).await;
    let registered = register_venue(&app.server, "owner@cafe.test").await;

    // backdate the trial well past its window
    let tenant_id = registered["tenant"]["id"].as_str().unwrap();
    let mut tenant = app.context.store.get_tenant(tenant_id).await.unwrap();
    tenant.trial_started_at = Some(Utc::now() - Duration::hours(2));
    app.context.store.update_tenant(&tenant).await.unwrap();

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "email": "owner@cafe.test",
            "password": TEST_PASSWORD
        }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["tenant"]["remainingTrialSeconds"], 0);
}

#[tokio::test]
async fn test_login_paid_tenant_has_no_trial_countdown() {
    let app = create_test_app(default_settings()).await;
    let registered = register_venue(&app.server, "owner@cafe.test").await;

    let tenant_id = registered["tenant"]["id"].as_str().unwrap();
    let mut tenant = app.context.store.get_tenant(tenant_id).await.unwrap();
    tenant.change_plan(db::PlanType::Paid, Utc::now());
    app.context.store.update_tenant(&tenant).await.unwrap();

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "email": "owner@cafe.test",
            "password": TEST_PASSWORD
        }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["tenant"]["isTrial"], false);
    assert!(body["tenant"]["remainingTrialSeconds"].is_null());
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = create_test_app(default_settings()).await;
    register_venue(&app.server, "owner@cafe.test").await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "email": "owner@cafe.test",
            "password": "wrong_password"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_nonexistent_user() {
    let app = create_test_app(default_settings()).await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "email": "nobody@cafe.test",
            "password": "password"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_login_inactive_account() {
    let app = create_test_app(default_settings()).await;
    register_venue(&app.server, "owner@cafe.test").await;

    let mut user = app.context.store.find_user_by_email("owner@cafe.test").await.unwrap().unwrap();
    user.is_active = false;
    app.context.store.update_user(&user).await.unwrap();

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "email": "owner@cafe.test",
            "password": TEST_PASSWORD
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "User account is inactive");
}

#[tokio::test]
async fn test_login_inactive_account_with_wrong_password_is_invalid_credentials() {
    let app = create_test_app(default_settings()).await;
    register_venue(&app.server, "owner@cafe.test").await;

    let mut user = app.context.store.find_user_by_email("owner@cafe.test").await.unwrap().unwrap();
    user.is_active = false;
    app.context.store.update_user(&user).await.unwrap();

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "email": "owner@cafe.test",
            "password": "wrong_password"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_logout_always_acknowledges() {
    let app = create_test_app(default_settings()).await;
    let registered = register_venue(&app.server, "owner@cafe.test").await;
    let token = registered["token"].as_str().unwrap();

    let with_token = app
        .server
        .post("/api/auth/logout")
        .add_header(header::AUTHORIZATION, format!("Bearer {token}"))
        .await;
    with_token.assert_status(StatusCode::OK);
    let body: Value = with_token.json();
    assert_eq!(body["success"], true);

    let garbage = app
        .server
        .post("/api/auth/logout")
        .add_header(header::AUTHORIZATION, "Bearer not-a-token")
        .await;
    garbage.assert_status(StatusCode::OK);

    let anonymous = app.server.post("/api/auth/logout").await;
    anonymous.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = create_test_app(default_settings()).await;

    let response = app.server.get("/api/tenant").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    let response = app
        .server
        .get("/api/tenant")
        .add_header(header::AUTHORIZATION, "Bearer invalid_token")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    use jsonwebtoken as jwt;

    let app = create_test_app(default_settings()).await;
    let registered = register_venue(&app.server, "owner@cafe.test").await;

    // sign an already expired session with the server's own key
    let now = Utc::now().timestamp();
    let expired_claims = auth::SessionClaims {
        sub: registered["user"]["id"].as_str().unwrap().to_string(),
        email: "owner@cafe.test".to_string(),
        name: "Ana Costa".to_string(),
        tenant_id: registered["tenant"]["id"].as_str().unwrap().to_string(),
        role: Role::BusinessOwner,
        iat: now - 7200,
        exp: now - 3600,
        iss: app.context.jwt.issuer.clone(),
        aud: app.context.jwt.audience.clone(),
    };
    let jwt_header = jwt::Header::new(jwt::Algorithm::HS256);
    let expired_token = jwt::encode(&jwt_header, &expired_claims, &app.context.jwt.encoding_key).unwrap();

    let response = app
        .server
        .get("/api/tenant")
        .add_header(header::AUTHORIZATION, format!("Bearer {expired_token}"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["message"], "Authentication token has expired");
}

#[tokio::test]
async fn test_malformed_json_login() {
    let app = create_test_app(default_settings()).await;

    let response = app.server.post("/api/auth/login").text("not json").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_missing_fields_login() {
    let app = create_test_app(default_settings()).await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "email": "owner@cafe.test"
            // missing password
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn test_register_missing_location() {
    let app = create_test_app(default_settings()).await;

    let response = app
        .server
        .post("/api/auth/register")
        .json(&json!({
            "email": "owner@cafe.test",
            "password": TEST_PASSWORD,
            "fullName": "Ana Costa",
            "venueName": "Corner Cafe"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("location"));
}

#[tokio::test]
async fn test_unknown_email_matches_wrong_password() {
    let app = create_test_app(default_settings()).await;
    register_venue(&app.server, "owner@cafe.test").await;

    let wrong_password = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "owner@cafe.test", "password": "not-the-password" }))
        .await;
    let unknown_email = app
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@cafe.test", "password": "not-the-password" }))
        .await;

    wrong_password.assert_status(StatusCode::UNAUTHORIZED);
    unknown_email.assert_status(StatusCode::UNAUTHORIZED);
    let wrong_password: Value = wrong_password.json();
    let unknown_email: Value = unknown_email.json();
    assert_eq!(wrong_password, unknown_email);
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app(default_settings()).await;

    let response = app.server.get("/health").await;
    response.assert_status(StatusCode::OK);
    response.assert_text("OK");
}
