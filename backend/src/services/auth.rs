//! Registration and login: the only code that creates sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth;
use crate::db::{self, PlanType, Role, StoreError, TenantStore, UserStore};
use crate::services::audit::{self, AuditEvent};
use crate::services::plan_gate;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User account is inactive")]
    AccountInactive,

    #[error("Tenant not found")]
    TenantNotFound,

    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("{0}")]
    InvalidRequest(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub venue_name: String,
    pub location: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub business_registration_number: Option<String>,
}

fn default_role() -> String {
    Role::BusinessOwner.as_str().to_string()
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub tenant_id: String,
}

impl From<&db::User> for UserSummary {
    fn from(user: &db::User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            tenant_id: user.tenant_id.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantSummary {
    pub id: String,
    pub name: String,
    pub location: String,
    pub is_active: bool,
    pub plan_type: PlanType,
    pub is_trial: bool,
    pub remaining_trial_seconds: Option<i64>,
}

impl TenantSummary {
    #[must_use]
    pub fn new(tenant: &db::Tenant, remaining_trial_seconds: Option<i64>) -> Self {
        Self {
            id: tenant.id.clone(),
            name: tenant.name.clone(),
            location: tenant.location.clone(),
            is_active: tenant.is_active,
            plan_type: tenant.plan_type,
            is_trial: tenant.plan_type == PlanType::Trial,
            remaining_trial_seconds,
        }
    }

    #[must_use]
    pub fn at(tenant: &db::Tenant, now: DateTime<Utc>) -> Self {
        Self::new(tenant, plan_gate::remaining_trial_seconds(tenant, now))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserSummary,
    pub tenant: TenantSummary,
}

fn require(value: &str, message: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::InvalidRequest(message.to_string()));
    }
    Ok(())
}

/// Parses a role for self-registration; system admins are provisioned from the CLI.
fn registration_role(role: &str) -> Result<Role, AuthError> {
    match role.parse::<Role>() {
        Ok(Role::SystemAdmin) => Err(AuthError::InvalidRequest("SystemAdmin accounts cannot self-register".to_string())),
        Ok(role) => Ok(role),
        Err(e) => Err(AuthError::InvalidRequest(e.to_string())),
    }
}

/// Creates a trial tenant and its first user, then opens a session for them.
pub async fn register<S>(store: &S, jwt: &auth::JwtContext, request: RegisterRequest) -> Result<AuthResponse, AuthError>
where
    S: TenantStore + UserStore + ?Sized,
{
    require(&request.email, "Email and password are required")?;
    require(&request.password, "Email and password are required")?;
    require(&request.venue_name, "Venue name and location are required")?;
    require(&request.location, "Venue name and location are required")?;
    let role = registration_role(&request.role)?;

    let existing = store
        .find_user_by_email(&request.email)
        .await
        .map_err(|e| AuthError::RegistrationFailed(e.to_string()))?;
    if existing.is_some() {
        return Err(AuthError::DuplicateEmail);
    }

    let tenant = db::Tenant::new_trial(request.venue_name.trim(), request.location.trim(), Utc::now());
    let password_hash =
        auth::hash_password(&request.password).map_err(|e| AuthError::RegistrationFailed(e.to_string()))?;
    let user = db::User::new(
        &request.email,
        request.full_name.trim(),
        password_hash,
        &tenant.id,
        role,
        request.business_registration_number,
    );

    store.add_tenant_with_owner(&tenant, &user).await.map_err(|e| match e {
        // a concurrent registration won the unique constraint
        StoreError::Conflict("user") => AuthError::DuplicateEmail,
        e => AuthError::RegistrationFailed(e.to_string()),
    })?;

    let issued = auth::issue_session_token(jwt, &user, &tenant.id)
        .map_err(|e| AuthError::RegistrationFailed(e.to_string()))?;

    audit::log_audit_event(&AuditEvent::TenantRegistered {
        tenant_id: tenant.id.clone(),
        user_id: user.id.clone(),
        email: user.email.clone(),
    });

    Ok(AuthResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: UserSummary::from(&user),
        tenant: TenantSummary::new(&tenant, Some(plan_gate::TRIAL_LIMIT_SECONDS)),
    })
}

/// Checks credentials and opens a session with the tenant's remaining trial time.
pub async fn login<S>(store: &S, jwt: &auth::JwtContext, request: LoginRequest) -> Result<AuthResponse, AuthError>
where
    S: TenantStore + UserStore + ?Sized,
{
    require(&request.email, "Email and password are required")?;
    require(&request.password, "Email and password are required")?;

    let result = authenticate(store, jwt, &request).await;
    if let Err(e) = &result {
        audit::log_audit_event(&AuditEvent::LoginFailed {
            email: db::normalize_email(&request.email),
            reason: e.to_string(),
        });
    }
    result
}

async fn authenticate<S>(store: &S, jwt: &auth::JwtContext, request: &LoginRequest) -> Result<AuthResponse, AuthError>
where
    S: TenantStore + UserStore + ?Sized,
{
    let found = store
        .find_user_by_email(&request.email)
        .await
        .map_err(|e| AuthError::LoginFailed(e.to_string()))?;
    let Some(user) = found else {
        auth::verify_dummy_password(&request.password);
        return Err(AuthError::InvalidCredentials);
    };

    let password_ok = auth::verify_password(&request.password, &user.password_hash).unwrap_or_else(|e| {
        tracing::error!(user_id = %user.id, "Stored password hash is unreadable: {e}");
        false
    });
    if !password_ok {
        return Err(AuthError::InvalidCredentials);
    }

    if !user.is_active {
        return Err(AuthError::AccountInactive);
    }

    let tenant = store.get_tenant(&user.tenant_id).await.map_err(|e| match e {
        StoreError::NotFound(_) => AuthError::TenantNotFound,
        e => AuthError::LoginFailed(e.to_string()),
    })?;

    let issued =
        auth::issue_session_token(jwt, &user, &user.tenant_id).map_err(|e| AuthError::LoginFailed(e.to_string()))?;

    audit::log_audit_event(&AuditEvent::LoginSucceeded {
        tenant_id: tenant.id.clone(),
        user_id: user.id.clone(),
        email: user.email.clone(),
    });

    Ok(AuthResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        user: UserSummary::from(&user),
        tenant: TenantSummary::at(&tenant, Utc::now()),
    })
}

/// Sessions are stateless: logging out only means the client drops its token.
///
/// The token, if any, is read without verification purely to attribute the log line.
pub fn logout(token: Option<&str>) {
    match token.map(auth::decode_unverified) {
        Some(Ok(claims)) => tracing::info!(
            user_id = claims.sub.as_deref().unwrap_or("unknown"),
            tenant_id = claims.tenant_id.as_deref().unwrap_or("unknown"),
            "Logout"
        ),
        Some(Err(_)) => tracing::info!("Logout with unreadable token"),
        None => tracing::info!("Logout without token"),
    }
}
