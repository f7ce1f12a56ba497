//! The shared track catalog. Every session may read it; only system admins edit it.

use serde::Deserialize;
use thiserror::Error;

use crate::auth::SessionClaims;
use crate::db::{Role, StoreError, Track, TrackStore};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Only system administrators can edit the catalog")]
    Forbidden,

    #[error("Track not found")]
    TrackNotFound,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Catalog operation failed: {0}")]
    OperationFailed(String),
}

impl From<StoreError> for CatalogError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => Self::TrackNotFound,
            e => Self::OperationFailed(e.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTrackRequest {
    pub title: String,
    pub artist: String,
    pub mood: Option<String>,
    pub storage_key: String,
}

/// Partial edit; absent fields keep their current value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTrackRequest {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub mood: Option<String>,
    pub storage_key: Option<String>,
}

fn require_admin(session: &SessionClaims) -> Result<(), CatalogError> {
    if session.role == Role::SystemAdmin {
        Ok(())
    } else {
        Err(CatalogError::Forbidden)
    }
}

pub async fn list<S: TrackStore + ?Sized>(store: &S) -> Result<Vec<Track>, CatalogError> {
    Ok(store.list_tracks().await?)
}

pub async fn get<S: TrackStore + ?Sized>(store: &S, id: &str) -> Result<Track, CatalogError> {
    Ok(store.get_track(id).await?)
}

pub async fn add<S: TrackStore + ?Sized>(
    store: &S,
    session: &SessionClaims,
    request: &NewTrackRequest,
) -> Result<Track, CatalogError> {
    require_admin(session)?;
    if request.title.trim().is_empty() || request.storage_key.trim().is_empty() {
        return Err(CatalogError::InvalidRequest("Title and storage key are required".to_string()));
    }

    let track = Track::new(
        request.title.trim(),
        request.artist.trim(),
        request.mood.clone(),
        request.storage_key.trim(),
    );
    store.add_track(&track).await?;
    tracing::info!(track_id = %track.id, storage_key = %track.storage_key, "Track added to catalog");
    Ok(track)
}

pub async fn update<S: TrackStore + ?Sized>(
    store: &S,
    session: &SessionClaims,
    id: &str,
    request: &UpdateTrackRequest,
) -> Result<Track, CatalogError> {
    require_admin(session)?;
    let mut track = store.get_track(id).await?;

    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(CatalogError::InvalidRequest("Title cannot be empty".to_string()));
        }
        title.trim().clone_into(&mut track.title);
    }
    if let Some(artist) = &request.artist {
        artist.trim().clone_into(&mut track.artist);
    }
    if let Some(mood) = &request.mood {
        track.mood = Some(mood.trim().to_string());
    }
    if let Some(storage_key) = &request.storage_key {
        if storage_key.trim().is_empty() {
            return Err(CatalogError::InvalidRequest("Storage key cannot be empty".to_string()));
        }
        storage_key.trim().clone_into(&mut track.storage_key);
    }

    store.update_track(&track).await?;
    tracing::info!(track_id = %track.id, storage_key = %track.storage_key, "Track updated");
    Ok(track)
}

pub async fn remove<S: TrackStore + ?Sized>(store: &S, session: &SessionClaims, id: &str) -> Result<(), CatalogError> {
    require_admin(session)?;
    store.delete_track(id).await?;
    tracing::info!(track_id = %id, "Track removed from catalog");
    Ok(())
}
