//! Session repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use campus_core::error::{AppError, ErrorKind};
use campus_core::result::AppResult;
use campus_entity::session::SessionRecord;

/// Repository for persisted session rows.
///
/// The in-memory registry is the read path during request handling; this
/// repository is its durable mirror.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load all non-expired sessions (registry bootstrap).
    pub async fn load_active(&self) -> AppResult<Vec<SessionRecord>> {
        sqlx::query_as::<_, SessionRecord>(
            "SELECT * FROM sessions WHERE expires_at > NOW() ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StoreUnavailable, "Failed to load sessions", e)
        })
    }

    /// Persist a new session record.
    pub async fn insert(&self, record: &SessionRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO sessions (id, token_hash, user_id, device_token, ip_address, \
             user_agent, created_at, expires_at, last_active_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(record.id)
        .bind(&record.token_hash)
        .bind(record.user_id)
        .bind(&record.device_token)
        .bind(&record.ip_address)
        .bind(&record.user_agent)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.last_active_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::StoreUnavailable, "Failed to persist session", e)
        })?;
        Ok(())
    }

    /// Delete a session by ID. Idempotent; returns whether a row matched.
    pub async fn delete_by_id(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::StoreUnavailable, "Failed to delete session", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete all sessions for a user. Returns the number of rows removed.
    pub async fn delete_by_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StoreUnavailable,
                    "Failed to delete user sessions",
                    e,
                )
            })?;
        Ok(result.rows_affected())
    }

    /// Delete sessions whose expiry has passed. Returns rows removed.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::StoreUnavailable,
                    "Failed to delete expired sessions",
                    e,
                )
            })?;
        Ok(result.rows_affected())
    }
}
