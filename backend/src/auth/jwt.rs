use std::fs;

use axum::Json;
use axum::extract::Request;
use axum::http;
use axum::response::IntoResponse;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken as jwt;
use rand::TryRngCore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::cfg;
use crate::db;

type TryRngError = <rand::rngs::OsRng as rand::TryRngCore>::Error;

#[rustfmt::skip]
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode JWT token")]
    EncodingFailed(jwt::errors::Error),

    #[error("Failed to decode JWT token")]
    DecodingFailed(jwt::errors::Error),

    #[error("File system operation failed")]
    FileSystemOperationFailed { #[from] source: std::io::Error },

    #[error("Random number generation operation failed")]
    RngOperationFailed { source: TryRngError },

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid authorization header")]
    InvalidAuthorizationHeader,
}

impl IntoResponse for JwtError {
    fn into_response(self) -> axum::response::Response {
        tracing::warn!(
            error_type = %std::any::type_name::<Self>(),
            error_message = %self);

        #[rustfmt::skip]
        #[allow(clippy::match_same_arms)]
        let (status, error_message) = match self {
            Self::RngOperationFailed { source: _ } => (http::StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            Self::FileSystemOperationFailed { source: _ } => (http::StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            Self::EncodingFailed(_) => (http::StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            Self::DecodingFailed(_) => (http::StatusCode::UNAUTHORIZED, "Invalid or missing authentication token".to_string()),
            Self::TokenExpired => (http::StatusCode::UNAUTHORIZED, "Authentication token has expired".to_string()),
            Self::InvalidToken => (http::StatusCode::UNAUTHORIZED, "Invalid authentication token".to_string()),
            Self::InvalidAuthorizationHeader => (http::StatusCode::UNAUTHORIZED, "Invalid or missing authorization header".to_string()),
        };

        let body = Json(json!({
            "success": false,
            "message": error_message
        }));

        (status, body).into_response()
    }
}

/// Claims of a session token that passed full verification.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SessionClaims {
    pub sub: String,       // Subject (user ID)
    pub email: String,
    pub name: String,      // Full name
    pub tenant_id: String, // Sole source of truth for tenant scoping
    pub role: db::Role,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Claims read from a token WITHOUT checking its signature or lifetime.
///
/// Only for logging and lookups; never for access decisions.
#[derive(Debug, Default, Deserialize)]
pub struct UnverifiedClaims {
    pub sub: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub tenant_id: Option<String>,
    pub role: Option<String>,
    pub iat: Option<i64>,
    pub exp: Option<i64>,
}

impl UnverifiedClaims {
    pub fn user_id(&self) -> Result<&str, JwtError> {
        self.sub.as_deref().ok_or(JwtError::InvalidToken)
    }

    pub fn tenant_id(&self) -> Result<&str, JwtError> {
        self.tenant_id.as_deref().ok_or(JwtError::InvalidToken)
    }

    pub fn email(&self) -> Result<&str, JwtError> {
        self.email.as_deref().ok_or(JwtError::InvalidToken)
    }
}

/// A freshly issued session token.
#[derive(Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct JwtContext {
    pub encoding_key: jwt::EncodingKey,
    pub decoding_key: jwt::DecodingKey,
    pub validation: jwt::Validation,
    pub issuer: String,
    pub audience: String,
    pub token_lifetime: i64,
}

impl JwtContext {
    pub fn new(settings: &cfg::JwtSettings, secret: &str) -> Result<Self, JwtError> {
        let encoding_key = jwt::EncodingKey::from_secret(secret.as_ref());
        let decoding_key = jwt::DecodingKey::from_secret(secret.as_ref());
        let mut validation = jwt::Validation::new(jwt::Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&settings.issuer]);
        validation.set_audience(&[&settings.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            token_lifetime: settings.token_lifetime_secs,
        })
    }
}

/// Issue a session token for `user`, scoped to `tenant_id`
pub fn issue_session_token(ctx: &JwtContext, user: &db::User, tenant_id: &str) -> Result<IssuedToken, JwtError> {
    let now = Utc::now();
    let expires_at = now + Duration::seconds(ctx.token_lifetime);
    let header = jwt::Header::new(jwt::Algorithm::HS256);
    let claims = SessionClaims {
        sub: user.id.clone(),
        email: user.email.clone(),
        name: user.full_name.clone(),
        tenant_id: tenant_id.to_string(),
        role: user.role,
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        iss: ctx.issuer.clone(),
        aud: ctx.audience.clone(),
    };
    let token = jwt::encode(&header, &claims, &ctx.encoding_key).map_err(JwtError::EncodingFailed)?;
    Ok(IssuedToken { token, expires_at })
}

/// Parse the payload of a token without verifying it
pub fn decode_unverified(token: &str) -> Result<UnverifiedClaims, JwtError> {
    if token.split('.').count() != 3 {
        return Err(JwtError::InvalidToken);
    }

    let mut validation = jwt::Validation::new(jwt::Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jwt::decode::<UnverifiedClaims>(token, &jwt::DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|_| JwtError::InvalidToken)
}

/// Fully verify a session token: signature, issuer, audience and expiry
pub fn verify_session_token(ctx: &JwtContext, token: &str) -> Result<SessionClaims, JwtError> {
    let token_data = jwt::decode::<SessionClaims>(token, &ctx.decoding_key, &ctx.validation)?;
    Ok(token_data.claims)
}

/// Extract the bearer credential from the Authorization header
pub fn bearer_token(headers: &http::HeaderMap) -> Result<&str, JwtError> {
    headers
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(JwtError::InvalidAuthorizationHeader)
}

pub fn verify_from_req(ctx: &JwtContext, req: &Request) -> Result<SessionClaims, JwtError> {
    let token = bearer_token(req.headers())?;
    verify_session_token(ctx, token)
}

/// Loads or creates a JWT secret
pub fn get_jwt_secret() -> Result<String, JwtError> {
    // check persisted secret file
    let secret_file_path = cfg::AppSettings::get_config_path().join(".jwt_secret");
    if let Ok(file_secret) = fs::read_to_string(&secret_file_path) {
        let trimmed_secret = file_secret.trim();
        if trimmed_secret.len() >= 32 {
            return Ok(trimmed_secret.to_string());
        }
    }

    // Create config directory if it doesn't exist
    if let Some(parent) = &secret_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Write the secret to file with restricted permissions
    let new_secret = generate_secure_secret()?;
    fs::write(&secret_file_path, &new_secret)?;

    // Set file permissions to be readable only by owner (Unix-like systems)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&secret_file_path)?.permissions();
        perms.set_mode(0o600); // rw-------
        fs::set_permissions(&secret_file_path, perms)?;
    }

    tracing::info!("Generated new JWT secret in {}", secret_file_path.to_string_lossy());
    Ok(new_secret)
}

/// Generates a cryptographically secure random secret
fn generate_secure_secret() -> Result<String, JwtError> {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| JwtError::RngOperationFailed { source: e })?;
    Ok(hex::encode(bytes))
}

/// Maps jsonwebtoken errors to our custom `JwtError` type
#[allow(clippy::match_same_arms)]
impl From<jwt::errors::Error> for JwtError {
    fn from(e: jwt::errors::Error) -> Self {
        use jwt::errors::ErrorKind;
        match e.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::InvalidToken => Self::InvalidToken,
            ErrorKind::Json(_) => Self::InvalidToken,
            ErrorKind::Base64(_) => Self::InvalidToken,
            ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => Self::InvalidToken,
            ErrorKind::MissingRequiredClaim(_) => Self::InvalidToken,
            _ => Self::DecodingFailed(e),
        }
    }
}
