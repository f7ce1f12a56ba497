use axum::body::Body;
use axum::http;
use axum::http::{HeaderValue, Request};
use chrono::Utc;
use jsonwebtoken as jwt;

use crate::auth::*;
use crate::cfg;
use crate::db;

const TEST_TENANT: &str = "2f1d7a52-6c0e-4d8e-9a43-1f0f2b7b0c11";

fn create_test_context() -> JwtContext {
    // For tests, create a JwtContext with a fixed secret
    JwtContext::new(&cfg::JwtSettings::default(), "test_secret_key_for_jwt_testing").unwrap()
}

fn test_user() -> db::User {
    db::User::new(
        "owner@cafe.test",
        "Ana Costa",
        "not-a-real-hash".to_string(),
        TEST_TENANT,
        db::Role::BusinessOwner,
        Some("BRN-42".to_string()),
    )
}

fn encode_claims(ctx: &JwtContext, iat: i64, exp: i64) -> String {
    let user = test_user();
    let claims = SessionClaims {
        sub: user.id,
        email: user.email,
        name: user.full_name,
        tenant_id: TEST_TENANT.to_string(),
        role: user.role,
        iat,
        exp,
        iss: ctx.issuer.clone(),
        aud: ctx.audience.clone(),
    };
    jwt::encode(&jwt::Header::new(jwt::Algorithm::HS256), &claims, &ctx.encoding_key).unwrap()
}

#[test]
fn test_issue_session_token_success() {
    let ctx = create_test_context();
    let issued = issue_session_token(&ctx, &test_user(), TEST_TENANT).unwrap();

    // Token should contain JWT structure (header.payload.signature)
    assert_eq!(issued.token.split('.').count(), 3);
    let lifetime = (issued.expires_at - Utc::now()).num_seconds();
    assert!((86_390..=86_400).contains(&lifetime));
}

#[test]
fn test_verify_session_token_success() {
    let ctx = create_test_context();
    let user = test_user();
    let issued = issue_session_token(&ctx, &user, TEST_TENANT).unwrap();

    let claims = verify_session_token(&ctx, &issued.token).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.email, "owner@cafe.test");
    assert_eq!(claims.name, "Ana Costa");
    assert_eq!(claims.tenant_id, TEST_TENANT);
    assert_eq!(claims.role, db::Role::BusinessOwner);
    assert_eq!(claims.iss, "tunegate");
    assert_eq!(claims.aud, "tunegate-clients");
    assert_eq!(claims.exp, issued.expires_at.timestamp());
}

#[test]
fn test_decode_unverified_reads_claims() {
    let ctx = create_test_context();
    let user = test_user();
    let issued = issue_session_token(&ctx, &user, TEST_TENANT).unwrap();

    let claims = decode_unverified(&issued.token).unwrap();
    assert_eq!(claims.tenant_id().unwrap(), TEST_TENANT);
    assert_eq!(claims.user_id().unwrap(), user.id);
    assert_eq!(claims.email().unwrap(), "owner@cafe.test");
}

#[test]
fn test_decode_unverified_ignores_signature_and_expiry() {
    // a token from another key that expired long ago still decodes
    let other = JwtContext::new(&cfg::JwtSettings::default(), "some_other_secret_entirely").unwrap();
    let now = Utc::now().timestamp();
    let token = encode_claims(&other, now - 7200, now - 3600);

    let claims = decode_unverified(&token).unwrap();
    assert_eq!(claims.tenant_id().unwrap(), TEST_TENANT);
}

#[test]
fn test_decode_unverified_requires_three_parts() {
    assert!(matches!(decode_unverified("abc.def"), Err(JwtError::InvalidToken)));
    assert!(matches!(decode_unverified("a.b.c.d"), Err(JwtError::InvalidToken)));
    assert!(matches!(decode_unverified(""), Err(JwtError::InvalidToken)));
}

#[test]
fn test_decode_unverified_rejects_garbage_payload() {
    assert!(matches!(decode_unverified("invalid.token.here"), Err(JwtError::InvalidToken)));
}

#[test]
fn test_decode_unverified_missing_tenant_claim() {
    #[derive(serde::Serialize)]
    struct Partial {
        sub: String,
    }
    let token = jwt::encode(
        &jwt::Header::new(jwt::Algorithm::HS256),
        &Partial { sub: "user-1".to_string() },
        &jwt::EncodingKey::from_secret(b"whatever"),
    )
    .unwrap();

    let claims = decode_unverified(&token).unwrap();
    assert_eq!(claims.user_id().unwrap(), "user-1");
    assert!(matches!(claims.tenant_id(), Err(JwtError::InvalidToken)));
    assert!(matches!(claims.email(), Err(JwtError::InvalidToken)));
}

#[test]
fn test_verify_rejects_expired_token() {
    let ctx = create_test_context();
    let now = Utc::now().timestamp();
    let token = encode_claims(&ctx, now - 7200, now - 1);

    assert!(matches!(verify_session_token(&ctx, &token), Err(JwtError::TokenExpired)));
}

#[test]
fn test_verify_rejects_wrong_secret() {
    let ctx = create_test_context();
    let other = JwtContext::new(&cfg::JwtSettings::default(), "different_secret_key").unwrap();
    let issued = issue_session_token(&other, &test_user(), TEST_TENANT).unwrap();

    assert!(verify_session_token(&ctx, &issued.token).is_err());
}

#[test]
fn test_verify_rejects_wrong_issuer_and_audience() {
    let ctx = create_test_context();
    let secret = "test_secret_key_for_jwt_testing";

    let foreign_issuer = cfg::JwtSettings {
        issuer: "someone-else".to_string(),
        ..Default::default()
    };
    let other = JwtContext::new(&foreign_issuer, secret).unwrap();
    let issued = issue_session_token(&other, &test_user(), TEST_TENANT).unwrap();
    assert!(matches!(verify_session_token(&ctx, &issued.token), Err(JwtError::InvalidToken)));

    let foreign_audience = cfg::JwtSettings {
        audience: "media-players".to_string(),
        ..Default::default()
    };
    let other = JwtContext::new(&foreign_audience, secret).unwrap();
    let issued = issue_session_token(&other, &test_user(), TEST_TENANT).unwrap();
    assert!(matches!(verify_session_token(&ctx, &issued.token), Err(JwtError::InvalidToken)));
}

#[test]
fn test_future_token_valid() {
    let ctx = create_test_context();
    let now = Utc::now().timestamp();
    let token = encode_claims(&ctx, now, now + 3600);

    assert!(verify_session_token(&ctx, &token).is_ok());
}

#[test]
fn test_verify_from_req_success() {
    let ctx = create_test_context();
    let issued = issue_session_token(&ctx, &test_user(), TEST_TENANT).unwrap();

    let mut req = Request::builder().body(Body::empty()).unwrap();
    req.headers_mut().insert(
        http::header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", issued.token)).unwrap(),
    );

    let claims = verify_from_req(&ctx, &req).unwrap();
    assert_eq!(claims.tenant_id, TEST_TENANT);
}

#[test]
fn test_verify_from_req_missing_header() {
    let ctx = create_test_context();
    let req = Request::builder().body(Body::empty()).unwrap();

    assert!(matches!(verify_from_req(&ctx, &req), Err(JwtError::InvalidAuthorizationHeader)));
}

#[test]
fn test_verify_from_req_wrong_format() {
    let ctx = create_test_context();
    let issued = issue_session_token(&ctx, &test_user(), TEST_TENANT).unwrap();

    let mut req = Request::builder().body(Body::empty()).unwrap();
    req.headers_mut().insert(
        http::header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Token {}", issued.token)).unwrap(),
    );

    assert!(matches!(verify_from_req(&ctx, &req), Err(JwtError::InvalidAuthorizationHeader)));
}
