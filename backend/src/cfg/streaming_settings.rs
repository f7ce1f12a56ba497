use serde::{Deserialize, Serialize};

/// Which collaborator mints signed audio URLs.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SignerKind {
    /// Signs grants in-process with the media grant key.
    #[default]
    Local,
    /// Delegates to the edge worker at `worker_url`.
    Worker,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StreamingSettings {
    /// Upper bound on the lifetime of a signed URL, in seconds.
    #[serde(default = "default_url_lifetime")]
    pub url_lifetime_secs: i64,

    /// Authorized playback when the request does not name a duration.
    #[serde(default = "default_playback")]
    pub default_playback_secs: i64,

    /// Deny streaming for trial tenants whose trial window has elapsed.
    #[serde(default = "default_enforce_trial_window")]
    pub enforce_trial_window: bool,

    #[serde(default)]
    pub signer: SignerKind,

    #[serde(default)]
    pub media_base_url: String,

    /// Key shared with the media edge. Derived from the session secret when empty.
    #[serde(default)]
    pub grant_secret: String,

    #[serde(default)]
    pub worker_url: String,
}

const fn default_url_lifetime() -> i64 {
    15 * 60
}

const fn default_playback() -> i64 {
    15 * 60
}

const fn default_enforce_trial_window() -> bool {
    true
}

impl Default for StreamingSettings {
    fn default() -> Self {
        Self {
            url_lifetime_secs: default_url_lifetime(),
            default_playback_secs: default_playback(),
            enforce_trial_window: default_enforce_trial_window(),
            signer: SignerKind::Local,
            media_base_url: "http://127.0.0.1:8787/media".to_string(),
            grant_secret: String::new(),
            worker_url: String::new(),
        }
    }
}
