//! Authentication and token configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HMAC-SHA256). Injected from the
    /// environment in production; the default exists for local development
    /// only.
    #[serde(default = "default_token_secret")]
    pub token_secret: String,
    /// Token validity window in days.
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: u64,
    /// Whether privileged roles (admin, organization, principal) may hold
    /// sessions on more than one device at a time.
    #[serde(default)]
    pub multi_device_login: bool,
    /// Minimum password length.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

fn default_token_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_token_ttl_days() -> u64 {
    120
}

fn default_password_min() -> usize {
    8
}
