//! Storage interfaces the core services are written against.
//!
//! The services never assume where records live: they take any `S` that
//! implements the traits they need. The SQLite [`Store`](crate::db::Store)
//! is the production implementation.

use async_trait::async_trait;
use thiserror::Error;

use crate::db::{Playlist, Tenant, Track, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error("Database operation failed: {0}")]
    OperationFailed(#[source] sqlx::Error),
}

impl StoreError {
    /// Maps a driver error for the given record kind.
    pub(crate) fn from_sqlx(entity: &'static str, error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => Self::NotFound(entity),
            sqlx::Error::Database(ref e) if e.is_unique_violation() => Self::Conflict(entity),
            _ => Self::OperationFailed(error),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Raised when a stored enum column holds an unknown value.
#[derive(Debug, Error)]
#[error("Unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[async_trait]
pub trait TenantStore: Send + Sync {
    async fn get_tenant(&self, id: &str) -> StoreResult<Tenant>;

    /// Persists a new tenant and its first user atomically, tenant first.
    async fn add_tenant_with_owner(&self, tenant: &Tenant, owner: &User) -> StoreResult<()>;

    async fn update_tenant(&self, tenant: &Tenant) -> StoreResult<()>;

    async fn delete_tenant(&self, id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Case-insensitive lookup; `None` when no user has this email.
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn get_user(&self, id: &str) -> StoreResult<User>;

    async fn add_user(&self, user: &User) -> StoreResult<()>;

    async fn update_user(&self, user: &User) -> StoreResult<()>;

    async fn list_users_by_tenant(&self, tenant_id: &str) -> StoreResult<Vec<User>>;
}

#[async_trait]
pub trait TrackStore: Send + Sync {
    async fn get_track(&self, id: &str) -> StoreResult<Track>;

    async fn list_tracks(&self) -> StoreResult<Vec<Track>>;

    async fn add_track(&self, track: &Track) -> StoreResult<()>;

    async fn update_track(&self, track: &Track) -> StoreResult<()>;

    async fn delete_track(&self, id: &str) -> StoreResult<()>;
}

/// Playlists are always addressed through their owning tenant; a playlist of
/// another tenant is indistinguishable from a missing one.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn get_playlist(&self, tenant_id: &str, id: &str) -> StoreResult<Playlist>;

    async fn list_playlists(&self, tenant_id: &str) -> StoreResult<Vec<Playlist>>;

    /// Persists the playlist together with its ordered track list.
    async fn add_playlist(&self, playlist: &Playlist) -> StoreResult<()>;

    /// Replaces name, vibe and the whole track list.
    async fn update_playlist(&self, playlist: &Playlist) -> StoreResult<()>;

    async fn delete_playlist(&self, tenant_id: &str, id: &str) -> StoreResult<()>;
}
