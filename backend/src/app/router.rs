use axum::Router;
use axum::extract::{Request, State};
use axum::middleware;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::core;
use crate::routes;

/// Back end server built from routes that are either public or require a verified session
pub fn create_router(context: core::ArcContext) -> Router {
    // Routes that need a verified session; claims are passed on as an extension
    let api_routes = Router::new()
        .route("/api/tracks", get(routes::tracks::list_tracks).post(routes::tracks::create_track))
        .route("/api/tracks/authorize-stream", post(routes::tracks::authorize_stream))
        .route(
            "/api/tracks/{id}",
            get(routes::tracks::get_track).put(routes::tracks::update_track).delete(routes::tracks::delete_track),
        )
        .route("/api/playlists", get(routes::playlists::list_playlists).post(routes::playlists::create_playlist))
        .route(
            "/api/playlists/{id}",
            get(routes::playlists::get_playlist)
                .put(routes::playlists::update_playlist)
                .delete(routes::playlists::delete_playlist),
        )
        .route("/api/tenant", get(routes::tenant::get_tenant).put(routes::tenant::update_profile))
        .route("/api/tenant/plan", put(routes::tenant::change_plan))
        .route("/api/tenant/users", get(routes::tenant::list_users).post(routes::tenant::add_user))
        .route("/api/tenant/users/{id}/deactivate", post(routes::tenant::deactivate_user))
        // system administrators only
        .route("/api/admin/tenants/{id}", delete(routes::tenant::delete_tenant))
        .route("/api/admin/tenants/{id}/deactivate", post(routes::tenant::deactivate_tenant))
        .route("/api/admin/tenants/{id}/activate", post(routes::tenant::activate_tenant))
        .layer(middleware::from_fn_with_state(context.clone(), auth_middleware))
        .with_state(context.clone());

    let auth_routes = Router::new()
        .route("/api/auth/register", post(routes::auth::register)) // creates a trial venue and returns a session
        .route("/api/auth/login", post(routes::auth::login)) // returns a session token
        .route("/api/auth/logout", post(routes::auth::logout)) // acknowledges; the client drops its token
        .with_state(context.clone());

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check)) // Health check endpoint
        .with_state(context);

    // Combine all routes
    Router::new()
        .merge(auth_routes)
        .merge(api_routes)
        .merge(public_routes)
        .layer(TraceLayer::new_for_http())
}

async fn auth_middleware(State(context): State<core::ArcContext>, mut req: Request, next: Next) -> Response {
    match auth::verify_from_req(&context.jwt, &req) {
        Ok(claims) => {
            tracing::debug!(
                user_id = claims.sub,
                tenant_id = claims.tenant_id,
                role = %claims.role,
                "Authenticated user accessing API"
            );
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!("Unauthorized access attempt: {}", e);
            e.into_response()
        }
    }
}
