//! Role assignment entity — a (role, school) grant stored per user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::RoleCode;

/// A (role code, school) pair granted to a user.
///
/// A user may hold several assignments, possibly at different schools
/// (parent at one school, teacher at another). For elevated roles the
/// assignment's school points at the organization unit (region/district)
/// the grant was issued against, not at an individual school.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleAssignment {
    /// Unique assignment identifier.
    pub id: Uuid,
    /// The user holding the grant.
    pub user_id: Uuid,
    /// Granted role code.
    pub role: RoleCode,
    /// School or organization unit the grant applies to.
    pub school_id: Uuid,
    /// When the grant was issued.
    pub created_at: DateTime<Utc>,
}
