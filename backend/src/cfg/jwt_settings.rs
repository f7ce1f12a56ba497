use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JwtSettings {
    /// Signing secret; when empty a persisted secret is loaded or generated on startup.
    #[serde(default)]
    pub secret: String,

    #[serde(default)]
    pub issuer: String,

    #[serde(default)]
    pub audience: String,

    #[serde(default)]
    pub token_lifetime_secs: i64, // In seconds (e.g., 24 hours = 86400)
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: "tunegate".to_string(),
            audience: "tunegate-clients".to_string(),
            token_lifetime_secs: 24 * 60 * 60, // 24 hours
        }
    }
}
