use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use jsonwebtoken as jwt;
use serde::{Deserialize, Serialize};
use sha2::Digest;
use thiserror::Error;
use url::Url;

use crate::cfg;

const GRANT_AUDIENCE: &str = "tunegate-media";
const GRANT_KEY_CONTEXT: &[u8] = b"tunegate media grant key v1:";

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error("Invalid signer URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Signer URL cannot carry a path: {0}")]
    UnsupportedUrl(String),

    #[error("Failed to sign grant: {0}")]
    GrantEncodingFailed(#[source] jwt::errors::Error),

    #[error("Signing worker request failed: {0}")]
    WorkerRequestFailed(#[from] reqwest::Error),

    #[error("Signing worker rejected the request with status {0}")]
    WorkerRejected(reqwest::StatusCode),

    #[error("Signing worker response is missing the signed URL")]
    MissingSignedUrl,
}

/// What a signed URL grants access to, and until when.
#[derive(Debug, Clone)]
pub struct SignRequest<'a> {
    pub storage_key: &'a str,
    pub venue_id: &'a str,
    pub track_id: &'a str,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SignRequest<'_> {
    fn validate(&self) -> Result<(), SignerError> {
        if self.storage_key.trim().is_empty() {
            return Err(SignerError::MissingArgument("storage key"));
        }
        if self.venue_id.trim().is_empty() {
            return Err(SignerError::MissingArgument("venue id"));
        }
        if self.track_id.trim().is_empty() {
            return Err(SignerError::MissingArgument("track id"));
        }
        Ok(())
    }
}

/// External collaborator that mints time-limited audio URLs.
#[async_trait]
pub trait UrlSigner: Send + Sync {
    async fn sign(&self, request: &SignRequest<'_>) -> Result<String, SignerError>;
}

/// Media grants never share a key with session tokens: an explicit `grant_secret`
/// wins, otherwise the key is SHA-256 over a fixed context and the session secret.
#[must_use]
pub fn grant_secret(settings: &cfg::StreamingSettings, session_secret: &str) -> String {
    if !settings.grant_secret.is_empty() {
        return settings.grant_secret.clone();
    }
    let mut hasher = sha2::Sha256::new();
    hasher.update(GRANT_KEY_CONTEXT);
    hasher.update(session_secret.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn build_signer(settings: &cfg::StreamingSettings, secret: &str) -> Result<Arc<dyn UrlSigner>, SignerError> {
    let signer: Arc<dyn UrlSigner> = match settings.signer {
        cfg::SignerKind::Local => {
            Arc::new(LocalUrlSigner::new(&settings.media_base_url, &grant_secret(settings, secret))?)
        }
        cfg::SignerKind::Worker => Arc::new(WorkerUrlSigner::new(&settings.worker_url, reqwest::Client::new())?),
    };
    tracing::info!(signer = ?settings.signer, "URL signer configured");
    Ok(signer)
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GrantClaims {
    pub sub: String, // Storage key
    pub venue_id: String,
    pub track_id: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs grants in-process: `{base}/{storage_key}?grant=<HS256 token>`.
pub struct LocalUrlSigner {
    base_url: Url,
    encoding_key: jwt::EncodingKey,
}

impl LocalUrlSigner {
    pub fn new(base_url: &str, secret: &str) -> Result<Self, SignerError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(SignerError::UnsupportedUrl(base_url.to_string()));
        }
        Ok(Self {
            base_url,
            encoding_key: jwt::EncodingKey::from_secret(secret.as_ref()),
        })
    }
}

#[async_trait]
impl UrlSigner for LocalUrlSigner {
    async fn sign(&self, request: &SignRequest<'_>) -> Result<String, SignerError> {
        request.validate()?;

        let claims = GrantClaims {
            sub: request.storage_key.to_string(),
            venue_id: request.venue_id.to_string(),
            track_id: request.track_id.to_string(),
            aud: GRANT_AUDIENCE.to_string(),
            iat: request.issued_at.timestamp(),
            exp: request.expires_at.timestamp(),
        };
        let grant = jwt::encode(&jwt::Header::new(jwt::Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(SignerError::GrantEncodingFailed)?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| SignerError::UnsupportedUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(request.storage_key.split('/').filter(|s| !s.is_empty()));
        url.query_pairs_mut().append_pair("grant", &grant);
        Ok(url.into())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkerSignRequest<'a> {
    storage_key: &'a str,
    venue_id: &'a str,
    track_id: &'a str,
    timestamp: String,
    expires_at: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkerSignResponse {
    signed_url: Option<String>,
}

/// Delegates signing to an edge worker over HTTP.
pub struct WorkerUrlSigner {
    worker_url: Url,
    http_client: reqwest::Client,
}

impl WorkerUrlSigner {
    pub fn new(worker_url: &str, http_client: reqwest::Client) -> Result<Self, SignerError> {
        Ok(Self {
            worker_url: Url::parse(worker_url)?,
            http_client,
        })
    }
}

#[async_trait]
impl UrlSigner for WorkerUrlSigner {
    async fn sign(&self, request: &SignRequest<'_>) -> Result<String, SignerError> {
        request.validate()?;

        let body = WorkerSignRequest {
            storage_key: request.storage_key,
            venue_id: request.venue_id,
            track_id: request.track_id,
            timestamp: request.issued_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            expires_at: request.expires_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let response = self.http_client.post(self.worker_url.clone()).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, storage_key = request.storage_key, "Signing worker rejected request");
            return Err(SignerError::WorkerRejected(status));
        }

        let response: WorkerSignResponse = response.json().await?;
        response
            .signed_url
            .filter(|url| !url.trim().is_empty())
            .ok_or(SignerError::MissingSignedUrl)
    }
}
