//! Academic period repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use campus_core::error::{AppError, ErrorKind};
use campus_core::result::AppResult;
use campus_entity::period::AcademicPeriod;

/// Repository for academic period lookups.
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    pool: PgPool,
}

impl PeriodRepository {
    /// Create a new period repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a period by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<AcademicPeriod>> {
        sqlx::query_as::<_, AcademicPeriod>("SELECT * FROM academic_periods WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find period", e))
    }
}
