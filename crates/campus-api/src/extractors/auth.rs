//! `AuthUser` extractor — resolves the bearer token into an
//! authorization context and injects it into handlers.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use campus_auth::AuthorizationContext;
use campus_core::error::AppError;
use campus_entity::session::DeviceInfo;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted authenticated context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthorizationContext);

impl AuthUser {
    /// Returns the inner context.
    pub fn context(&self) -> &AuthorizationContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = AuthorizationContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::token_invalid("Missing authentication token"))?;

        let context = state.session_manager.authenticate(&token).await?;
        Ok(AuthUser(context))
    }
}

/// Pulls the token from the `Authorization: Bearer` header, falling back
/// to a `token` query parameter for transports that cannot set headers
/// (upgraded streaming connections).
fn bearer_token(parts: &Parts) -> Option<String> {
    if let Some(header) = parts
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    parts.uri.query()?.split('&').find_map(|pair| {
        pair.strip_prefix("token=")
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

/// Builds login device info from request headers.
pub fn client_device(headers: &HeaderMap, device_token: Option<String>) -> DeviceInfo {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .unwrap_or("unknown")
        .trim()
        .to_string();

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    DeviceInfo {
        device_token,
        ip_address,
        user_agent,
    }
}
