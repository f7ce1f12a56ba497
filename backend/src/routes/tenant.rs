use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use crate::auth::SessionClaims;
use crate::core;
use crate::services::tenants::{self, AddStaffRequest, ChangePlanRequest, TenantError, UpdateProfileRequest};

impl IntoResponse for TenantError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(
            error_type = %std::any::type_name::<Self>(),
            error_message = %self);

        #[rustfmt::skip]
        #[allow(clippy::match_same_arms)]
        let status = match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::AdminOnly => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateEmail => StatusCode::BAD_REQUEST,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::OperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub async fn get_tenant(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<impl IntoResponse, TenantError> {
    let summary = tenants::get_summary(&context.store, &claims).await?;
    Ok(Json(summary))
}

pub async fn update_profile(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<impl IntoResponse, TenantError> {
    let Json(request) = payload.map_err(|e| TenantError::InvalidRequest(e.body_text()))?;
    let summary = tenants::update_profile(&context.store, &claims, &request).await?;
    Ok(Json(summary))
}

pub async fn change_plan(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    payload: Result<Json<ChangePlanRequest>, JsonRejection>,
) -> Result<impl IntoResponse, TenantError> {
    let Json(request) = payload.map_err(|e| TenantError::InvalidRequest(e.body_text()))?;
    let summary = tenants::change_plan(&context.store, &claims, &request).await?;
    Ok(Json(summary))
}

pub async fn list_users(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<impl IntoResponse, TenantError> {
    let users = tenants::list_users(&context.store, &claims).await?;
    Ok(Json(users))
}

pub async fn add_user(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    payload: Result<Json<AddStaffRequest>, JsonRejection>,
) -> Result<impl IntoResponse, TenantError> {
    let Json(request) = payload.map_err(|e| TenantError::InvalidRequest(e.body_text()))?;
    let user = tenants::add_staff_user(&context.store, &claims, &request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn deactivate_user(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, TenantError> {
    let user = tenants::deactivate_user(&context.store, &claims, &user_id).await?;
    Ok(Json(user))
}

/// System admin: suspend a venue; its sessions stay valid but streaming is refused.
pub async fn deactivate_tenant(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, TenantError> {
    let summary = tenants::set_tenant_active(&context.store, &claims, &tenant_id, false).await?;
    Ok(Json(summary))
}

pub async fn activate_tenant(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, TenantError> {
    let summary = tenants::set_tenant_active(&context.store, &claims, &tenant_id, true).await?;
    Ok(Json(summary))
}

pub async fn delete_tenant(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    Path(tenant_id): Path<String>,
) -> Result<impl IntoResponse, TenantError> {
    tenants::delete_tenant(&context.store, &claims, &tenant_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
