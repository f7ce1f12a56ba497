//! Venue playlists. Every operation is scoped to the tenant in the caller's session.

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::SessionClaims;
use crate::db::{Playlist, PlaylistStore, StoreError, TrackStore};

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("Playlist not found")]
    NotFound,

    #[error("Track {0} not found")]
    UnknownTrack(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Playlist operation failed: {0}")]
    OperationFailed(String),
}

impl From<StoreError> for PlaylistError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => Self::NotFound,
            e => Self::OperationFailed(e.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylistRequest {
    pub name: String,
    pub vibe: Option<String>,
    #[serde(default)]
    pub track_ids: Vec<String>,
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlaylistRequest {
    pub name: Option<String>,
    pub vibe: Option<String>,
    pub track_ids: Option<Vec<String>>,
}

fn playlist_name(name: &str) -> Result<String, PlaylistError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PlaylistError::InvalidRequest("Playlist name is required".to_string()));
    }
    Ok(name.to_string())
}

/// Drops repeated ids, keeping first occurrences, and checks each track is in the catalog.
async fn catalog_tracks<S>(store: &S, track_ids: &[String]) -> Result<Vec<String>, PlaylistError>
where
    S: TrackStore + ?Sized,
{
    let mut unique: Vec<String> = Vec::with_capacity(track_ids.len());
    for id in track_ids {
        if unique.contains(id) {
            continue;
        }
        match store.get_track(id).await {
            Ok(_) => unique.push(id.clone()),
            Err(StoreError::NotFound(_)) => return Err(PlaylistError::UnknownTrack(id.clone())),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(unique)
}

pub async fn list<S>(store: &S, session: &SessionClaims) -> Result<Vec<Playlist>, PlaylistError>
where
    S: PlaylistStore + ?Sized,
{
    Ok(store.list_playlists(&session.tenant_id).await?)
}

pub async fn get<S>(store: &S, session: &SessionClaims, id: &str) -> Result<Playlist, PlaylistError>
where
    S: PlaylistStore + ?Sized,
{
    Ok(store.get_playlist(&session.tenant_id, id).await?)
}

pub async fn create<S>(store: &S, session: &SessionClaims, request: &NewPlaylistRequest) -> Result<Playlist, PlaylistError>
where
    S: PlaylistStore + TrackStore + ?Sized,
{
    let name = playlist_name(&request.name)?;
    let track_ids = catalog_tracks(store, &request.track_ids).await?;

    let playlist = Playlist::new(&session.tenant_id, &name, request.vibe.clone(), track_ids);
    store.add_playlist(&playlist).await?;

    tracing::info!(tenant_id = %playlist.tenant_id, playlist_id = %playlist.id, "Playlist created");
    Ok(playlist)
}

pub async fn update<S>(
    store: &S,
    session: &SessionClaims,
    id: &str,
    request: &UpdatePlaylistRequest,
) -> Result<Playlist, PlaylistError>
where
    S: PlaylistStore + TrackStore + ?Sized,
{
    let mut playlist = store.get_playlist(&session.tenant_id, id).await?;

    if let Some(name) = &request.name {
        playlist.name = playlist_name(name)?;
    }
    if let Some(vibe) = &request.vibe {
        playlist.vibe = Some(vibe.clone());
    }
    if let Some(track_ids) = &request.track_ids {
        playlist.track_ids = catalog_tracks(store, track_ids).await?;
    }
    playlist.updated_at = Utc::now();
    store.update_playlist(&playlist).await?;

    tracing::info!(tenant_id = %playlist.tenant_id, playlist_id = %playlist.id, "Playlist updated");
    Ok(playlist)
}

pub async fn delete<S>(store: &S, session: &SessionClaims, id: &str) -> Result<(), PlaylistError>
where
    S: PlaylistStore + ?Sized,
{
    store.delete_playlist(&session.tenant_id, id).await?;
    tracing::info!(tenant_id = %session.tenant_id, playlist_id = %id, "Playlist deleted");
    Ok(())
}
