use chrono::Utc;

use super::common::default_settings;
use crate::app;
use crate::core;
use crate::db::{self, PlaylistStore, Role, StoreError, TenantStore, TrackStore, UserStore};

async fn create_store() -> db::Store {
    let db = core::create_db_context(&default_settings().database).await.unwrap();
    app::run_migrations(&db).await.unwrap();
    db::Store::new(db)
}

fn owner_of(tenant: &db::Tenant, email: &str) -> db::User {
    db::User::new(email, "Ana Costa", "hash".to_string(), &tenant.id, Role::BusinessOwner, None)
}

#[tokio::test]
async fn test_tenant_and_owner_round_trip() {
    let store = create_store().await;
    let tenant = db::Tenant::new_trial("Corner Cafe", "Lisbon", Utc::now());
    let owner = owner_of(&tenant, "Owner@Cafe.test");

    store.add_tenant_with_owner(&tenant, &owner).await.unwrap();

    let loaded = store.get_tenant(&tenant.id).await.unwrap();
    assert_eq!(loaded.name, "Corner Cafe");
    assert_eq!(loaded.plan_type, db::PlanType::Trial);
    assert_eq!(loaded.trial_started_at.map(|t| t.timestamp()), tenant.trial_started_at.map(|t| t.timestamp()));

    let user = store.find_user_by_email("OWNER@CAFE.TEST").await.unwrap().unwrap();
    assert_eq!(user.id, owner.id);
    assert_eq!(user.tenant_id, tenant.id);
    assert_eq!(user.role, Role::BusinessOwner);
}

#[tokio::test]
async fn test_registration_is_atomic() {
    let store = create_store().await;
    let first = db::Tenant::new_trial("Corner Cafe", "Lisbon", Utc::now());
    store.add_tenant_with_owner(&first, &owner_of(&first, "owner@cafe.test")).await.unwrap();

    // the owner insert fails on the unique email, so the tenant must not persist
    let second = db::Tenant::new_trial("Second Venue", "Porto", Utc::now());
    let result = store.add_tenant_with_owner(&second, &owner_of(&second, "owner@cafe.test")).await;

    assert!(matches!(result, Err(StoreError::Conflict("user"))));
    assert!(matches!(store.get_tenant(&second.id).await, Err(StoreError::NotFound("tenant"))));
}

#[tokio::test]
async fn test_missing_records_are_not_found() {
    let store = create_store().await;

    assert!(matches!(store.get_tenant("missing").await, Err(StoreError::NotFound("tenant"))));
    assert!(matches!(store.get_user("missing").await, Err(StoreError::NotFound("user"))));
    assert!(matches!(store.get_track("missing").await, Err(StoreError::NotFound("track"))));
    assert!(store.find_user_by_email("nobody@cafe.test").await.unwrap().is_none());

    let ghost = db::Tenant::new_trial("Ghost", "Nowhere", Utc::now());
    assert!(matches!(store.update_tenant(&ghost).await, Err(StoreError::NotFound("tenant"))));
    assert!(matches!(store.delete_tenant(&ghost.id).await, Err(StoreError::NotFound("tenant"))));
}

#[tokio::test]
async fn test_user_requires_existing_tenant() {
    let store = create_store().await;
    let ghost = db::Tenant::new_trial("Ghost", "Nowhere", Utc::now());

    let result = store.add_user(&owner_of(&ghost, "orphan@cafe.test")).await;
    assert!(matches!(result, Err(StoreError::OperationFailed(_))));
}

#[tokio::test]
async fn test_delete_tenant_removes_its_users() {
    let store = create_store().await;
    let tenant = db::Tenant::new_trial("Corner Cafe", "Lisbon", Utc::now());
    store.add_tenant_with_owner(&tenant, &owner_of(&tenant, "owner@cafe.test")).await.unwrap();
    let staff = db::User::new("staff@cafe.test", "Staff", "hash".to_string(), &tenant.id, Role::Staff, None);
    store.add_user(&staff).await.unwrap();
    assert_eq!(store.list_users_by_tenant(&tenant.id).await.unwrap().len(), 2);

    store.delete_tenant(&tenant.id).await.unwrap();

    assert!(store.list_users_by_tenant(&tenant.id).await.unwrap().is_empty());
    assert!(store.find_user_by_email("owner@cafe.test").await.unwrap().is_none());
}

#[tokio::test]
async fn test_track_catalog() {
    let store = create_store().await;
    let track = db::Track::new("Morning Light", "The Quiet Hours", None, "tracks/morning-light.mp3");

    store.add_track(&track).await.unwrap();
    assert!(matches!(store.add_track(&track).await, Err(StoreError::Conflict("track"))));

    let loaded = store.get_track(&track.id).await.unwrap();
    assert_eq!(loaded.storage_key, "tracks/morning-light.mp3");
    assert!(loaded.mood.is_none());
    assert_eq!(store.list_tracks().await.unwrap().len(), 1);

    let mut edited = loaded.clone();
    edited.title = "Morning Light (Live)".to_string();
    edited.mood = Some("warm".to_string());
    store.update_track(&edited).await.unwrap();
    let reloaded = store.get_track(&track.id).await.unwrap();
    assert_eq!(reloaded.title, "Morning Light (Live)");
    assert_eq!(reloaded.mood.as_deref(), Some("warm"));

    store.delete_track(&track.id).await.unwrap();
    assert!(matches!(store.delete_track(&track.id).await, Err(StoreError::NotFound("track"))));
    assert!(matches!(store.update_track(&edited).await, Err(StoreError::NotFound("track"))));
}

#[tokio::test]
async fn test_playlists_are_scoped_to_their_tenant() {
    let store = create_store().await;
    let cafe = db::Tenant::new_trial("Corner Cafe", "Lisbon", Utc::now());
    let bar = db::Tenant::new_trial("Night Bar", "Porto", Utc::now());
    store.add_tenant_with_owner(&cafe, &owner_of(&cafe, "owner@cafe.test")).await.unwrap();
    store.add_tenant_with_owner(&bar, &owner_of(&bar, "owner@bar.test")).await.unwrap();
    let first = db::Track::new("One", "A", None, "tracks/one.mp3");
    let second = db::Track::new("Two", "B", None, "tracks/two.mp3");
    store.add_track(&first).await.unwrap();
    store.add_track(&second).await.unwrap();

    let mut playlist = db::Playlist::new(
        &cafe.id,
        "Mornings",
        Some("calm".to_string()),
        vec![second.id.clone(), first.id.clone()],
    );
    store.add_playlist(&playlist).await.unwrap();

    let loaded = store.get_playlist(&cafe.id, &playlist.id).await.unwrap();
    assert_eq!(loaded.track_ids, vec![second.id.clone(), first.id.clone()]);
    assert!(matches!(store.get_playlist(&bar.id, &playlist.id).await, Err(StoreError::NotFound("playlist"))));
    assert!(store.list_playlists(&bar.id).await.unwrap().is_empty());

    // another tenant cannot overwrite or delete it either
    let mut hijacked = loaded.clone();
    hijacked.tenant_id.clone_from(&bar.id);
    assert!(matches!(store.update_playlist(&hijacked).await, Err(StoreError::NotFound("playlist"))));
    assert!(matches!(store.delete_playlist(&bar.id, &playlist.id).await, Err(StoreError::NotFound("playlist"))));

    playlist.track_ids = vec![first.id.clone()];
    store.update_playlist(&playlist).await.unwrap();
    assert_eq!(store.get_playlist(&cafe.id, &playlist.id).await.unwrap().track_ids, vec![first.id.clone()]);

    // removing a track from the catalog drops it from playlists
    store.delete_track(&first.id).await.unwrap();
    assert!(store.get_playlist(&cafe.id, &playlist.id).await.unwrap().track_ids.is_empty());

    store.delete_tenant(&cafe.id).await.unwrap();
    assert!(store.list_playlists(&cafe.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_store_ping() {
    let store = create_store().await;
    store.ping().await.unwrap();
}
