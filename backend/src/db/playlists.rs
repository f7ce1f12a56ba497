use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteConnection};

use crate::db::{PlaylistStore, Store, StoreError, StoreResult};

/// An ordered selection of catalog tracks owned by one tenant.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Free-form vibe or genre label.
    pub vibe: Option<String>,
    pub track_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Playlist {
    #[must_use]
    pub fn new(tenant_id: &str, name: &str, vibe: Option<String>, track_ids: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            name: name.to_string(),
            vibe,
            track_ids,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(FromRow)]
struct PlaylistRow {
    id: String,
    tenant_id: String,
    name: String,
    vibe: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PlaylistRow {
    fn with_tracks(self, track_ids: Vec<String>) -> Playlist {
        Playlist {
            id: self.id,
            tenant_id: self.tenant_id,
            name: self.name,
            vibe: self.vibe,
            track_ids,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const PLAYLIST_COLUMNS: &str = "id, tenant_id, name, vibe, created_at, updated_at";

impl Store {
    async fn playlist_track_ids(&self, playlist_id: &str) -> StoreResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT track_id FROM playlist_tracks WHERE playlist_id = ? ORDER BY position",
        )
        .bind(playlist_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| StoreError::from_sqlx("playlist", e))
    }
}

async fn insert_tracks(conn: &mut SqliteConnection, playlist: &Playlist) -> StoreResult<()> {
    for (position, track_id) in (0_i64..).zip(&playlist.track_ids) {
        sqlx::query("INSERT INTO playlist_tracks (playlist_id, track_id, position) VALUES (?, ?, ?)")
            .bind(&playlist.id)
            .bind(track_id)
            .bind(position)
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::from_sqlx("playlist track", e))?;
    }
    Ok(())
}

#[async_trait]
impl PlaylistStore for Store {
    async fn get_playlist(&self, tenant_id: &str, id: &str) -> StoreResult<Playlist> {
        let row = sqlx::query_as::<_, PlaylistRow>(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE id = ? AND tenant_id = ?"
        ))
        .bind(id)
        .bind(tenant_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| StoreError::from_sqlx("playlist", e))?;

        let track_ids = self.playlist_track_ids(&row.id).await?;
        Ok(row.with_tracks(track_ids))
    }

    async fn list_playlists(&self, tenant_id: &str) -> StoreResult<Vec<Playlist>> {
        let rows = sqlx::query_as::<_, PlaylistRow>(&format!(
            "SELECT {PLAYLIST_COLUMNS} FROM playlists WHERE tenant_id = ? ORDER BY created_at"
        ))
        .bind(tenant_id)
        .fetch_all(&self.db)
        .await
        .map_err(|e| StoreError::from_sqlx("playlist", e))?;

        let mut playlists = Vec::with_capacity(rows.len());
        for row in rows {
            let track_ids = self.playlist_track_ids(&row.id).await?;
            playlists.push(row.with_tracks(track_ids));
        }
        Ok(playlists)
    }

    async fn add_playlist(&self, playlist: &Playlist) -> StoreResult<()> {
        let mut tx = self.db.begin().await.map_err(StoreError::OperationFailed)?;

        sqlx::query(
            r"
            INSERT INTO playlists (id, tenant_id, name, vibe, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&playlist.id)
        .bind(&playlist.tenant_id)
        .bind(&playlist.name)
        .bind(&playlist.vibe)
        .bind(playlist.created_at)
        .bind(playlist.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::from_sqlx("playlist", e))?;

        insert_tracks(&mut *tx, playlist).await?;

        tx.commit().await.map_err(StoreError::OperationFailed)?;
        Ok(())
    }

    async fn update_playlist(&self, playlist: &Playlist) -> StoreResult<()> {
        let mut tx = self.db.begin().await.map_err(StoreError::OperationFailed)?;

        let result = sqlx::query("UPDATE playlists SET name = ?, vibe = ?, updated_at = ? WHERE id = ? AND tenant_id = ?")
            .bind(&playlist.name)
            .bind(&playlist.vibe)
            .bind(playlist.updated_at)
            .bind(&playlist.id)
            .bind(&playlist.tenant_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::from_sqlx("playlist", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("playlist"));
        }

        sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = ?")
            .bind(&playlist.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::from_sqlx("playlist", e))?;
        insert_tracks(&mut *tx, playlist).await?;

        tx.commit().await.map_err(StoreError::OperationFailed)?;
        Ok(())
    }

    async fn delete_playlist(&self, tenant_id: &str, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM playlists WHERE id = ? AND tenant_id = ?")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.db)
            .await
            .map_err(|e| StoreError::from_sqlx("playlist", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("playlist"));
        }
        Ok(())
    }
}
