//! Live room, presence, and video provider configuration.

use serde::{Deserialize, Serialize};

/// Live-session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveConfig {
    /// Lifetime of the teacher presence key in seconds. Each accepted ping
    /// extends it by this amount.
    #[serde(default = "default_presence_ttl")]
    pub presence_ttl_seconds: u64,
    /// Application id registered with the video provider (`iss` claim).
    #[serde(default = "default_app_id")]
    pub app_id: String,
    /// Shared secret used to sign join tokens.
    #[serde(default = "default_app_secret")]
    pub app_secret: String,
    /// Video provider domain (`sub` claim).
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Audience expected by the video provider (`aud` claim).
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Join token validity window in seconds.
    #[serde(default = "default_token_ttl")]
    pub join_token_ttl_seconds: u64,
    /// Attempts at the atomic create before giving up.
    #[serde(default = "default_create_attempts")]
    pub create_attempts: u32,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            presence_ttl_seconds: default_presence_ttl(),
            app_id: default_app_id(),
            app_secret: default_app_secret(),
            domain: default_domain(),
            audience: default_audience(),
            join_token_ttl_seconds: default_token_ttl(),
            create_attempts: default_create_attempts(),
        }
    }
}

fn default_presence_ttl() -> u64 {
    90
}

fn default_app_id() -> String {
    "classhub".to_string()
}

fn default_app_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_domain() -> String {
    "meet.localhost".to_string()
}

fn default_audience() -> String {
    "jitsi".to_string()
}

fn default_token_ttl() -> u64 {
    600
}

fn default_create_attempts() -> u32 {
    3
}
