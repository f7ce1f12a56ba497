use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use crate::auth::SessionClaims;
use crate::core;
use crate::services::playlists::{self, NewPlaylistRequest, PlaylistError, UpdatePlaylistRequest};

impl IntoResponse for PlaylistError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!(
            error_type = %std::any::type_name::<Self>(),
            error_message = %self);

        #[rustfmt::skip]
        #[allow(clippy::match_same_arms)]
        let status = match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UnknownTrack(_) => StatusCode::BAD_REQUEST,
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

pub async fn list_playlists(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<impl IntoResponse, PlaylistError> {
    let playlists = playlists::list(&context.store, &claims).await?;
    Ok(Json(playlists))
}

pub async fn get_playlist(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PlaylistError> {
    let playlist = playlists::get(&context.store, &claims, &id).await?;
    Ok(Json(playlist))
}

pub async fn create_playlist(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    payload: Result<Json<NewPlaylistRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PlaylistError> {
    let Json(request) = payload.map_err(|e| PlaylistError::InvalidRequest(e.body_text()))?;
    let playlist = playlists::create(&context.store, &claims, &request).await?;
    Ok((StatusCode::CREATED, Json(playlist)))
}

pub async fn update_playlist(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePlaylistRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PlaylistError> {
    let Json(request) = payload.map_err(|e| PlaylistError::InvalidRequest(e.body_text()))?;
    let playlist = playlists::update(&context.store, &claims, &id, &request).await?;
    Ok(Json(playlist))
}

pub async fn delete_playlist(
    State(context): State<core::ArcContext>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, PlaylistError> {
    playlists::delete(&context.store, &claims, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
