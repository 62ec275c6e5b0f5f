//! Client device information captured at login.

use serde::{Deserialize, Serialize};

/// Raw device information supplied with a login or switch request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Opaque client device token (push registration etc.).
    pub device_token: Option<String>,
    /// Client IP address.
    pub ip_address: String,
    /// Raw User-Agent header value.
    pub user_agent: Option<String>,
}

/// Parsed device metadata derived from a User-Agent string, returned by
/// the session-listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// Operating system / platform family.
    pub platform: String,
    /// Browser or client application family.
    pub client: String,
}

impl DeviceMeta {
    /// Derive coarse platform/client families from a User-Agent value.
    ///
    /// This is a best-effort substring classification, not a full UA
    /// parser; unknown agents come back as "other".
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        let ua = match user_agent {
            Some(v) => v,
            None => {
                return Self {
                    platform: "other".to_string(),
                    client: "other".to_string(),
                };
            }
        };

        let platform = if ua.contains("Android") {
            "android"
        } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iOS") {
            "ios"
        } else if ua.contains("Windows") {
            "windows"
        } else if ua.contains("Mac OS") || ua.contains("Macintosh") {
            "macos"
        } else if ua.contains("Linux") {
            "linux"
        } else {
            "other"
        };

        // Order matters: Edge and Chrome both advertise "Chrome", Chrome
        // and Safari both advertise "Safari".
        let client = if ua.contains("Edg/") {
            "edge"
        } else if ua.contains("OPR/") || ua.contains("Opera") {
            "opera"
        } else if ua.contains("Chrome/") {
            "chrome"
        } else if ua.contains("Firefox/") {
            "firefox"
        } else if ua.contains("Safari/") {
            "safari"
        } else if ua.contains("okhttp") || ua.contains("CFNetwork") {
            "mobile-app"
        } else {
            "other"
        };

        Self {
            platform: platform.to_string(),
            client: client.to_string(),
        }
    }
}
