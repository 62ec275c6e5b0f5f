//! Organization unit repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use campus_core::error::{AppError, ErrorKind};
use campus_core::result::AppResult;
use campus_entity::school::School;

/// Repository for organization tree queries.
#[derive(Debug, Clone)]
pub struct SchoolRepository {
    pool: PgPool,
}

impl SchoolRepository {
    /// Create a new school repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a unit by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<School>> {
        sqlx::query_as::<_, School>("SELECT * FROM schools WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find school", e))
    }

    /// Batch-find units by ID.
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<School>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, School>("SELECT * FROM schools WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to batch-load schools", e)
            })
    }

    /// Find units by their short codes.
    pub async fn find_by_codes(&self, codes: &[String]) -> AppResult<Vec<School>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, School>("SELECT * FROM schools WHERE code = ANY($1) ORDER BY code")
            .bind(codes)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find schools by code", e)
            })
    }

    /// Find all units whose parent is in the given set, bounded by `limit`.
    pub async fn find_by_parents(&self, parent_ids: &[Uuid], limit: i64) -> AppResult<Vec<School>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, School>(
            "SELECT * FROM schools WHERE parent_id = ANY($1) ORDER BY name LIMIT $2",
        )
        .bind(parent_ids)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find schools by parent", e)
        })
    }

    /// Find every unit in the tree, bounded by `limit`.
    pub async fn find_all(&self, limit: i64) -> AppResult<Vec<School>> {
        sqlx::query_as::<_, School>("SELECT * FROM schools ORDER BY name LIMIT $1")
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list schools", e))
    }
}
