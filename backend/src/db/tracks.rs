use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::db::{Store, StoreError, StoreResult, TrackStore};

/// An audio asset in the shared catalog.
#[derive(Clone, Debug, Deserialize, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub mood: Option<String>,
    /// Object key in external storage.
    pub storage_key: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Track {
    #[must_use]
    pub fn new(title: &str, artist: &str, mood: Option<String>, storage_key: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            mood,
            storage_key: storage_key.to_string(),
            uploaded_at: Utc::now(),
        }
    }
}

#[async_trait]
impl TrackStore for Store {
    async fn get_track(&self, id: &str) -> StoreResult<Track> {
        sqlx::query_as::<_, Track>(
            "SELECT id, title, artist, mood, storage_key, uploaded_at FROM tracks WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| StoreError::from_sqlx("track", e))
    }

    async fn list_tracks(&self) -> StoreResult<Vec<Track>> {
        sqlx::query_as::<_, Track>(
            "SELECT id, title, artist, mood, storage_key, uploaded_at FROM tracks ORDER BY uploaded_at DESC",
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| StoreError::from_sqlx("track", e))
    }

    async fn add_track(&self, track: &Track) -> StoreResult<()> {
        sqlx::query(
            r"
            INSERT INTO tracks (id, title, artist, mood, storage_key, uploaded_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&track.id)
        .bind(&track.title)
        .bind(&track.artist)
        .bind(&track.mood)
        .bind(&track.storage_key)
        .bind(track.uploaded_at)
        .execute(&self.db)
        .await
        .map_err(|e| StoreError::from_sqlx("track", e))?;
        Ok(())
    }

    async fn update_track(&self, track: &Track) -> StoreResult<()> {
        let result = sqlx::query("UPDATE tracks SET title = ?, artist = ?, mood = ?, storage_key = ? WHERE id = ?")
            .bind(&track.title)
            .bind(&track.artist)
            .bind(&track.mood)
            .bind(&track.storage_key)
            .bind(&track.id)
            .execute(&self.db)
            .await
            .map_err(|e| StoreError::from_sqlx("track", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("track"));
        }
        Ok(())
    }

    async fn delete_track(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM tracks WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| StoreError::from_sqlx("track", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("track"));
        }
        Ok(())
    }
}
