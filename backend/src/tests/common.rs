use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::Value;
use serde_json::json;

use crate::app;
use crate::auth;
use crate::cfg;
use crate::core;
use crate::db;
use crate::services::signer;

pub const TEST_SECRET: &str = "test__secret__key__for__jwt__testing";
pub const TEST_PASSWORD: &str = "abcdefghijklmnopqrstuvwxyz";

pub struct TestApp {
    pub server: TestServer,
    pub context: core::ArcContext,
}

pub fn default_settings() -> cfg::AppSettings {
    cfg::AppSettings {
        jwt: cfg::JwtSettings {
            secret: TEST_SECRET.to_string(),
            ..Default::default()
        },
        // in-memory SQLite database shared by the pool's connections
        database: cfg::DatabaseSettings {
            url: "sqlite::memory:".to_string(),
            max_connections: 5,
        },
        ..Default::default()
    }
}

pub async fn create_test_app(settings: cfg::AppSettings) -> TestApp {
    let db = core::create_db_context(&settings.database).await.unwrap();
    app::run_migrations(&db).await.unwrap();

    let jwt = auth::JwtContext::new(&settings.jwt, TEST_SECRET).unwrap();
    let signer = signer::build_signer(&settings.streaming, TEST_SECRET).unwrap();
    let context = core::Context::new(db::Store::new(db), jwt, signer, settings);

    let server = TestServer::new(app::create_router(context.clone())).unwrap();
    TestApp { server, context }
}

pub async fn register_venue(server: &TestServer, email: &str) -> Value {
    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "email": email,
            "password": TEST_PASSWORD,
            "fullName": "Ana Costa",
            "venueName": "Corner Cafe",
            "location": "Lisbon"
        }))
        .await;

    response.assert_status(StatusCode::CREATED);
    response.json()
}

/// Adds a track straight through the store, bypassing the admin-only route.
pub async fn seed_track(context: &core::ArcContext, storage_key: &str) -> db::Track {
    use crate::db::TrackStore;

    let track = db::Track::new("Morning Light", "The Quiet Hours", Some("calm".to_string()), storage_key);
    context.store.add_track(&track).await.unwrap();
    track
}
