//! Academic period entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An academic period (term/quarter) a session may be pinned to.
///
/// The selected period rides along in the token claims and is attached to
/// the authorization context; it does not participate in role/school
/// matching.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AcademicPeriod {
    /// Unique period identifier.
    pub id: Uuid,
    /// Display name (e.g. "2025-2026 Q2").
    pub name: String,
    /// First day of the period.
    pub starts_on: NaiveDate,
    /// Last day of the period.
    pub ends_on: NaiveDate,
    /// When the period was created.
    pub created_at: DateTime<Utc>,
}
