//! Tenant self-management, always scoped to the caller's own tenant.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::{self, SessionClaims};
use crate::db::{self, PlanType, Role, StoreError, TenantStore, UserStore};
use crate::services::audit::{self, AuditEvent};
use crate::services::auth::{TenantSummary, UserSummary};

#[derive(Debug, Error)]
pub enum TenantError {
    #[error("Only business owners and administrators can manage the venue")]
    Forbidden,

    #[error("Only system administrators can manage other venues")]
    AdminOnly,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Tenant operation failed: {0}")]
    OperationFailed(String),
}

impl From<StoreError> for TenantError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(entity) => Self::NotFound(entity),
            StoreError::Conflict("user") => Self::DuplicateEmail,
            e => Self::OperationFailed(e.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePlanRequest {
    pub plan_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStaffRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: String,
    pub location: String,
}

fn require_manager(session: &SessionClaims) -> Result<(), TenantError> {
    if session.role.can_manage_tenant() {
        Ok(())
    } else {
        Err(TenantError::Forbidden)
    }
}

fn require_admin(session: &SessionClaims) -> Result<(), TenantError> {
    if session.role == Role::SystemAdmin {
        Ok(())
    } else {
        Err(TenantError::AdminOnly)
    }
}

/// Admin actions never target the administrator's own tenant.
fn other_tenant<'a>(session: &SessionClaims, tenant_id: &'a str) -> Result<&'a str, TenantError> {
    if tenant_id == session.tenant_id {
        return Err(TenantError::InvalidRequest("You cannot change your own venue's status".to_string()));
    }
    Ok(tenant_id)
}

pub async fn get_summary<S>(store: &S, session: &SessionClaims) -> Result<TenantSummary, TenantError>
where
    S: TenantStore + ?Sized,
{
    let tenant = store.get_tenant(&session.tenant_id).await?;
    Ok(TenantSummary::at(&tenant, Utc::now()))
}

/// Moves the caller's tenant to another plan.
pub async fn change_plan<S>(
    store: &S,
    session: &SessionClaims,
    request: &ChangePlanRequest,
) -> Result<TenantSummary, TenantError>
where
    S: TenantStore + ?Sized,
{
    require_manager(session)?;
    let plan = request
        .plan_type
        .parse::<PlanType>()
        .map_err(|e| TenantError::InvalidRequest(e.to_string()))?;

    let mut tenant = store.get_tenant(&session.tenant_id).await?;
    let now = Utc::now();
    tenant.change_plan(plan, now);
    store.update_tenant(&tenant).await?;

    audit::log_audit_event(&AuditEvent::PlanChanged {
        tenant_id: tenant.id.clone(),
        user_id: session.sub.clone(),
        plan: plan.to_string(),
    });

    Ok(TenantSummary::at(&tenant, now))
}

/// Renames or relocates the caller's venue.
pub async fn update_profile<S>(
    store: &S,
    session: &SessionClaims,
    request: &UpdateProfileRequest,
) -> Result<TenantSummary, TenantError>
where
    S: TenantStore + ?Sized,
{
    require_manager(session)?;
    if request.name.trim().is_empty() || request.location.trim().is_empty() {
        return Err(TenantError::InvalidRequest("Venue name and location are required".to_string()));
    }

    let mut tenant = store.get_tenant(&session.tenant_id).await?;
    let now = Utc::now();
    request.name.trim().clone_into(&mut tenant.name);
    request.location.trim().clone_into(&mut tenant.location);
    tenant.updated_at = now;
    store.update_tenant(&tenant).await?;

    tracing::info!(tenant_id = %tenant.id, user_id = %session.sub, "Venue profile updated");
    Ok(TenantSummary::at(&tenant, now))
}

/// Flips another tenant's active flag. Inactive tenants keep their data but cannot stream.
pub async fn set_tenant_active<S>(
    store: &S,
    session: &SessionClaims,
    tenant_id: &str,
    active: bool,
) -> Result<TenantSummary, TenantError>
where
    S: TenantStore + ?Sized,
{
    require_admin(session)?;
    let mut tenant = store.get_tenant(other_tenant(session, tenant_id)?).await?;
    let now = Utc::now();
    tenant.is_active = active;
    tenant.updated_at = now;
    store.update_tenant(&tenant).await?;

    audit::log_audit_event(&AuditEvent::TenantStatusChanged {
        tenant_id: tenant.id.clone(),
        user_id: session.sub.clone(),
        status: if active { "active" } else { "inactive" }.to_string(),
    });
    Ok(TenantSummary::at(&tenant, now))
}

/// Removes another tenant with its users and playlists.
pub async fn delete_tenant<S>(store: &S, session: &SessionClaims, tenant_id: &str) -> Result<(), TenantError>
where
    S: TenantStore + ?Sized,
{
    require_admin(session)?;
    store.delete_tenant(other_tenant(session, tenant_id)?).await?;

    audit::log_audit_event(&AuditEvent::TenantStatusChanged {
        tenant_id: tenant_id.to_string(),
        user_id: session.sub.clone(),
        status: "deleted".to_string(),
    });
    Ok(())
}

pub async fn list_users<S>(store: &S, session: &SessionClaims) -> Result<Vec<UserSummary>, TenantError>
where
    S: UserStore + ?Sized,
{
    require_manager(session)?;
    let users = store.list_users_by_tenant(&session.tenant_id).await?;
    Ok(users.iter().map(UserSummary::from).collect())
}

/// Adds a staff member to the caller's tenant.
pub async fn add_staff_user<S>(
    store: &S,
    session: &SessionClaims,
    request: &AddStaffRequest,
) -> Result<UserSummary, TenantError>
where
    S: UserStore + ?Sized,
{
    require_manager(session)?;
    if request.email.trim().is_empty() || request.password.trim().is_empty() {
        return Err(TenantError::InvalidRequest("Email and password are required".to_string()));
    }
    if store.find_user_by_email(&request.email).await?.is_some() {
        return Err(TenantError::DuplicateEmail);
    }

    let password_hash =
        auth::hash_password(&request.password).map_err(|e| TenantError::OperationFailed(e.to_string()))?;
    let user = db::User::new(
        &request.email,
        request.full_name.trim(),
        password_hash,
        &session.tenant_id,
        Role::Staff,
        None,
    );
    store.add_user(&user).await?;

    tracing::info!(tenant_id = %session.tenant_id, user_id = %user.id, "Staff user added");
    Ok(UserSummary::from(&user))
}

/// Soft-deactivates a member of the caller's tenant; they can no longer log in.
pub async fn deactivate_user<S>(store: &S, session: &SessionClaims, user_id: &str) -> Result<UserSummary, TenantError>
where
    S: UserStore + ?Sized,
{
    require_manager(session)?;
    if user_id == session.sub {
        return Err(TenantError::InvalidRequest("You cannot deactivate your own account".to_string()));
    }

    let mut user = store.get_user(user_id).await?;
    // another tenant's user is reported as missing
    if user.tenant_id != session.tenant_id {
        audit::log_audit_event(&AuditEvent::TenantMismatch {
            token_tenant_id: session.tenant_id.clone(),
            requested_tenant_id: user.tenant_id,
            user_id: session.sub.clone(),
        });
        return Err(TenantError::NotFound("user"));
    }

    user.is_active = false;
    store.update_user(&user).await?;

    tracing::info!(tenant_id = %session.tenant_id, user_id = %user.id, "User deactivated");
    Ok(UserSummary::from(&user))
}
