//! Stream authorization: plan-gated, tenant-scoped signed URL grants.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::SessionClaims;
use crate::cfg;
use crate::db::{StoreError, TenantStore, TrackStore};
use crate::services::audit::{self, AuditEvent};
use crate::services::plan_gate::{self, PlanDecision};
use crate::services::signer::{SignRequest, UrlSigner};

pub const MIN_PLAYBACK_SECS: i64 = 1;
pub const MAX_PLAYBACK_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Track not found")]
    TrackNotFound,

    #[error("Failed to authorize stream: {0}")]
    AuthorizationFailed(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamAuthorizationRequest {
    pub track_id: String,
    pub venue_id: String,
    pub playback_duration: Option<i64>,
}

impl StreamAuthorizationRequest {
    fn validate(&self) -> Result<(), StreamError> {
        if self.track_id.trim().is_empty() {
            return Err(StreamError::InvalidRequest("Track ID is required".to_string()));
        }
        if self.venue_id.trim().is_empty() {
            return Err(StreamError::InvalidRequest("Venue ID is required".to_string()));
        }
        if let Some(duration) = self.playback_duration
            && !(MIN_PLAYBACK_SECS..=MAX_PLAYBACK_SECS).contains(&duration)
        {
            return Err(StreamError::InvalidRequest(
                "Playback duration must be between 1 second and 24 hours".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamAuthorization {
    pub track_id: String,
    pub venue_id: String,
    pub signed_url: String,
    pub expires_at: chrono::DateTime<Utc>,
    pub authorized_duration: i64,
    pub success: bool,
}

/// Grants a time-boxed URL for one track to the session's own venue.
///
/// The venue in the request must be the tenant the session was issued for.
/// The URL expires after the configured lifetime or the authorized duration,
/// whichever is shorter.
pub async fn authorize<S>(
    store: &S,
    signer: &dyn UrlSigner,
    settings: &cfg::StreamingSettings,
    session: &SessionClaims,
    request: &StreamAuthorizationRequest,
) -> Result<StreamAuthorization, StreamError>
where
    S: TenantStore + TrackStore + ?Sized,
{
    request.validate()?;

    let track = store.get_track(&request.track_id).await.map_err(|e| match e {
        StoreError::NotFound(_) => StreamError::TrackNotFound,
        e => StreamError::AuthorizationFailed(e.to_string()),
    })?;

    if request.venue_id != session.tenant_id {
        audit::log_audit_event(&AuditEvent::TenantMismatch {
            token_tenant_id: session.tenant_id.clone(),
            requested_tenant_id: request.venue_id.clone(),
            user_id: session.sub.clone(),
        });
        return Err(StreamError::AuthorizationFailed("Venue does not match the session".to_string()));
    }

    let tenant = store.get_tenant(&session.tenant_id).await.map_err(|e| match e {
        StoreError::NotFound(_) => StreamError::AuthorizationFailed("Tenant not found".to_string()),
        e => StreamError::AuthorizationFailed(e.to_string()),
    })?;

    let authorized_duration = request.playback_duration.unwrap_or(settings.default_playback_secs);
    let now = Utc::now();

    if let PlanDecision::Denied(reason) =
        plan_gate::evaluate(&tenant, authorized_duration, now, settings.enforce_trial_window)
    {
        audit::log_audit_event(&AuditEvent::StreamDenied {
            tenant_id: tenant.id.clone(),
            track_id: track.id.clone(),
            reason: reason.message().to_string(),
        });
        return Err(StreamError::AuthorizationFailed(reason.message().to_string()));
    }

    let expires_at = now + Duration::seconds(settings.url_lifetime_secs.min(authorized_duration));
    let signed_url = signer
        .sign(&SignRequest {
            storage_key: &track.storage_key,
            venue_id: &tenant.id,
            track_id: &track.id,
            issued_at: now,
            expires_at,
        })
        .await
        .map_err(|e| {
            tracing::error!(track_id = %track.id, tenant_id = %tenant.id, "URL signing failed: {e}");
            StreamError::AuthorizationFailed(e.to_string())
        })?;

    audit::log_audit_event(&AuditEvent::StreamAuthorized {
        tenant_id: tenant.id.clone(),
        track_id: track.id.clone(),
        authorized_duration,
    });

    Ok(StreamAuthorization {
        track_id: track.id,
        venue_id: tenant.id,
        signed_url,
        expires_at,
        authorized_duration,
        success: true,
    })
}
