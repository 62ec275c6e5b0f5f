//! Session listing, revocation, and presence handlers.

use axum::Json;
use axum::extract::State;

use campus_core::error::AppError;

use crate::dto::request::RevokeSessionsRequest;
use crate::dto::response::{ApiResponse, MessageResponse, OnlineCountResponse, SessionResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/auth/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<SessionResponse>>>, ApiError> {
    let current_id = auth.session().id;
    let sessions = state
        .session_manager
        .list_sessions(auth.user_id())
        .iter()
        .map(|r| SessionResponse::from_record(r, current_id))
        .collect();

    Ok(Json(ApiResponse::ok(sessions)))
}

/// DELETE /api/auth/sessions
///
/// With a JSON body listing session ids, closes only those sessions of
/// the caller; without one, closes them all.
pub async fn revoke_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
    body: Option<Json<RevokeSessionsRequest>>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let closed = match body {
        Some(Json(req)) if !req.session_ids.is_empty() => {
            state
                .session_manager
                .delete_sessions(auth.user_id(), &req.session_ids)
                .await?
        }
        _ => state.session_manager.logout_all(auth.user_id()).await?,
    };

    Ok(Json(ApiResponse::ok(MessageResponse {
        message: format!("Closed {closed} sessions"),
    })))
}

/// GET /api/admin/online
pub async fn online_count(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<OnlineCountResponse>>, ApiError> {
    if !auth.role().is_elevated() {
        return Err(AppError::no_available_role(format!(
            "Role {} may not view online presence",
            auth.role()
        ))
        .into());
    }

    Ok(Json(ApiResponse::ok(OnlineCountResponse {
        online: state.session_manager.online_count(),
    })))
}
