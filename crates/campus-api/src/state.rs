//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use campus_auth::session::SessionManager;
use campus_core::config::AppConfig;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// PostgreSQL connection pool (health probe).
    pub db_pool: PgPool,
    /// Session lifecycle manager.
    pub session_manager: Arc<SessionManager>,
}
