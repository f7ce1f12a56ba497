use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use crate::auth;
use crate::core;
use crate::services::auth::{self as orchestrator, AuthError, LoginRequest, RegisterRequest};

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(
            error_type = %std::any::type_name::<Self>(),
            error_message = %self);

        #[rustfmt::skip]
        #[allow(clippy::match_same_arms)]
        let status = match self {
            Self::DuplicateEmail => StatusCode::BAD_REQUEST,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::RegistrationFailed(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AccountInactive => StatusCode::UNAUTHORIZED,
            Self::TenantNotFound => StatusCode::UNAUTHORIZED,
            Self::LoginFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

/// Register route: creates a trial venue with its owner and returns a session
pub async fn register(
    State(context): State<core::ArcContext>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(request) = payload.map_err(|e| AuthError::InvalidRequest(e.body_text()))?;
    tracing::info!("Registering venue: {}", request.venue_name);
    let response = orchestrator::register(&context.store, &context.jwt, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login route
pub async fn login(
    State(context): State<core::ArcContext>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(request) = payload.map_err(|e| AuthError::InvalidRequest(e.body_text()))?;
    tracing::info!("Logging in user: {}", request.email);
    let response = orchestrator::login(&context.store, &context.jwt, request).await?;
    Ok(Json(response))
}

/// Logout route: sessions are stateless, so this always succeeds
pub async fn logout(headers: HeaderMap) -> impl IntoResponse {
    orchestrator::logout(auth::bearer_token(&headers).ok());
    Json(json!({
        "success": true,
        "message": "Logged out successfully"
    }))
}
