use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use crate::auth::SessionClaims;
use crate::core;
use crate::services::catalog::{self, CatalogError, NewTrackRequest, UpdateTrackRequest};
use crate::services::streaming::{self, StreamAuthorizationRequest, StreamError};

impl IntoResponse for StreamError {
    fn into_response(self) -> axum::response::Response {
        tracing::warn!(
            error_type = %std::any::type_name::<Self>(),
            error_message = %self);

        // every refusal is reported the same way to the player
        let body = Json(json!({
            "success": false,
            "errorMessage": self.to_string()
        }));

        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(
            error_type = %std::any::type_name::<Self>(),
            error_message = %self);

        let status = match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::TrackNotFound => StatusCode::NOT_FOUND,
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

/// Authorize playback of one track for the caller's venue
pub async fn authorize_stream(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    payload: Result<Json<StreamAuthorizationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, StreamError> {
    let Json(request) = payload.map_err(|e| StreamError::InvalidRequest(e.body_text()))?;
    let authorization = streaming::authorize(
        &context.store,
        context.signer.as_ref(),
        &context.settings.streaming,
        &claims,
        &request,
    )
    .await?;
    Ok(Json(authorization))
}

pub async fn list_tracks(State(context): State<core::ArcContext>) -> Result<impl IntoResponse, CatalogError> {
    let tracks = catalog::list(&context.store).await?;
    Ok(Json(tracks))
}

pub async fn get_track(
    State(context): State<core::ArcContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    let track = catalog::get(&context.store, &id).await?;
    Ok(Json(track))
}

pub async fn create_track(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    payload: Result<Json<NewTrackRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CatalogError> {
    let Json(request) = payload.map_err(|e| CatalogError::InvalidRequest(e.body_text()))?;
    let track = catalog::add(&context.store, &claims, &request).await?;
    Ok((StatusCode::CREATED, Json(track)))
}

pub async fn update_track(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTrackRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CatalogError> {
    let Json(request) = payload.map_err(|e| CatalogError::InvalidRequest(e.body_text()))?;
    let track = catalog::update(&context.store, &claims, &id, &request).await?;
    Ok(Json(track))
}

pub async fn delete_track(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, CatalogError> {
    catalog::remove(&context.store, &claims, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
