//! Auth handlers — login, switch, logout, me.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use validator::Validate;

use campus_core::error::AppError;

use crate::dto::request::{LoginRequest, SwitchRequest};
use crate::dto::response::{
    ApiResponse, EvictedSessionResponse, LoginResponse, MessageResponse, ScopeResponse,
    UserResponse,
};
use crate::error::ApiError;
use crate::extractors::{AuthUser, client_device};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let device = client_device(&headers, req.device_token.clone());
    let outcome = state
        .session_manager
        .login(
            &req.username,
            &req.password,
            req.role,
            req.school_id,
            req.period_id,
            &device,
        )
        .await?;

    // Re-authenticating the fresh token builds the same context the
    // client will see on its next request.
    let ctx = state.session_manager.authenticate(&outcome.token).await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        token: outcome.token,
        expires_at: outcome.session.expires_at,
        user: UserResponse::from_user(ctx.user()),
        scope: ScopeResponse::from_context(&ctx),
        evicted_session: outcome
            .evicted
            .as_ref()
            .map(EvictedSessionResponse::from_record),
    })))
}

/// POST /api/auth/switch
pub async fn switch(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Json(req): Json<SwitchRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let device = client_device(&headers, req.device_token.clone());
    let outcome = state
        .session_manager
        .switch(
            auth.context(),
            req.role,
            req.school_id,
            req.period_id,
            &device,
        )
        .await?;

    let ctx = state.session_manager.authenticate(&outcome.token).await?;

    Ok(Json(ApiResponse::ok(LoginResponse {
        token: outcome.token,
        expires_at: outcome.session.expires_at,
        user: UserResponse::from_user(ctx.user()),
        scope: ScopeResponse::from_context(&ctx),
        evicted_session: outcome
            .evicted
            .as_ref()
            .map(EvictedSessionResponse::from_record),
    })))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.session_manager.logout(auth.session().id).await?;

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: "Logged out successfully".to_string(),
    })))
}

/// GET /api/auth/me
pub async fn me(
    auth: AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    Ok(Json(ApiResponse::ok(MeResponse {
        user: UserResponse::from_user(auth.user()),
        scope: ScopeResponse::from_context(auth.context()),
    })))
}

/// Profile plus resolved scope, as returned by `/api/auth/me`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MeResponse {
    /// The authenticated user.
    pub user: UserResponse,
    /// The resolved scope.
    pub scope: ScopeResponse,
}
